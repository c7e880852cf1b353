use pfe_sim_abstract::CostConfig;

/// Logistic cost curve over latency.
///
/// Zero up to the no-cost threshold, saturated at `max_cost` from the
/// timeout threshold on, and a logistic in between centred on the midpoint of
/// the two thresholds. The steepness puts the curve at 1% and 99% of
/// `max_cost` at the thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostFunction {
    no_cost_threshold_ms: f64,
    timeout_threshold_ms: f64,
    max_cost: f64,
    midpoint_ms: f64,
    steepness: f64,
}

impl CostFunction {
    pub fn new(config: CostConfig) -> Self {
        let span = config.timeout_threshold_ms - config.no_cost_threshold_ms;
        Self {
            no_cost_threshold_ms: config.no_cost_threshold_ms,
            timeout_threshold_ms: config.timeout_threshold_ms,
            max_cost: config.max_cost,
            midpoint_ms: (config.no_cost_threshold_ms + config.timeout_threshold_ms) / 2.0,
            steepness: 2.0 * 99f64.ln() / span,
        }
    }

    pub fn cost(&self, latency_ms: f64) -> f64 {
        if latency_ms <= self.no_cost_threshold_ms {
            return 0.0;
        }
        if latency_ms >= self.timeout_threshold_ms {
            return self.max_cost;
        }
        self.max_cost / (1.0 + (-self.steepness * (latency_ms - self.midpoint_ms)).exp())
    }

    pub fn midpoint_ms(&self) -> f64 {
        self.midpoint_ms
    }

    pub fn max_cost(&self) -> f64 {
        self.max_cost
    }
}

impl Default for CostFunction {
    fn default() -> Self {
        Self::new(CostConfig::default())
    }
}

impl From<CostConfig> for CostFunction {
    fn from(config: CostConfig) -> Self {
        Self::new(config)
    }
}
