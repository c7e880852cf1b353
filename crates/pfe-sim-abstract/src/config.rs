use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::network::{NetworkModel, standard_models};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Parameters of the latency cost curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Loads finishing before this are free.
    pub no_cost_threshold_ms: f64,
    /// Past this the cost is saturated.
    pub timeout_threshold_ms: f64,
    pub max_cost: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            no_cost_threshold_ms: 100.0,
            timeout_threshold_ms: 3000.0,
            max_cost: 100.0,
        }
    }
}

/// Histogram bucket widths used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    pub wait_time_ms: u64,
    pub cost: u64,
    pub request_bytes: u64,
    pub response_bytes: u64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            wait_time_ms: 100,
            cost: 1,
            request_bytes: 100,
            response_bytes: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub cost: CostConfig,
    pub buckets: BucketConfig,
    /// Number of parallel workers the sequences are split across.
    pub workers: usize,
    pub network_models: Vec<NetworkModel>,
    pub default_font_id: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cost: CostConfig::default(),
            buckets: BucketConfig::default(),
            workers: 1,
            network_models: standard_models(),
            default_font_id: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Validation("workers must be at least 1".into()));
        }
        if self.network_models.is_empty() {
            return Err(ConfigError::Validation(
                "at least one network model is required".into(),
            ));
        }

        let mut names = BTreeSet::new();
        for model in &self.network_models {
            if !names.insert(model.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate network model '{}'",
                    model.name
                )));
            }
            if !(model.bandwidth_up > 0.0 && model.bandwidth_down > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "network model '{}' needs positive bandwidth",
                    model.name
                )));
            }
            if !(model.rtt >= 0.0) || !(model.weight >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "network model '{}' has a negative rtt or weight",
                    model.name
                )));
            }
        }

        let cost = &self.cost;
        if !(cost.no_cost_threshold_ms < cost.timeout_threshold_ms) {
            return Err(ConfigError::Validation(format!(
                "no_cost_threshold_ms ({}) must be below timeout_threshold_ms ({})",
                cost.no_cost_threshold_ms, cost.timeout_threshold_ms
            )));
        }
        if !(cost.max_cost > 0.0) {
            return Err(ConfigError::Validation("max_cost must be positive".into()));
        }

        let b = &self.buckets;
        if [b.wait_time_ms, b.cost, b.request_bytes, b.response_bytes].contains(&0) {
            return Err(ConfigError::Validation(
                "bucket widths must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn network_model(&self, name: &str) -> Option<&NetworkModel> {
        self.network_models.iter().find(|m| m.name == name)
    }
}

/// Immutable settings cloned into every worker when it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub font_directory: PathBuf,
    pub default_font_id: Option<String>,
}
