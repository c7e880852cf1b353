use serde::{Deserialize, Serialize};

/// Estimated size in bytes of an HTTP/2 request header once HPACK has warmed up.
pub const ESTIMATED_HTTP_REQUEST_HEADER_SIZE: u64 = 35;

/// Estimated size in bytes of an HTTP/2 response header once HPACK has warmed up.
pub const ESTIMATED_HTTP_RESPONSE_HEADER_SIZE: u64 = 35;

/// A connection class. RTT is in ms, bandwidth in bytes per ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    pub name: String,
    pub rtt: f64,
    pub bandwidth_up: f64,
    pub bandwidth_down: f64,
    /// Coarse bucket such as "3G" used for weighted roll-ups.
    #[serde(default)]
    pub category: Option<String>,
    /// Relative prevalence of this model inside its category.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl NetworkModel {
    pub fn new(name: impl Into<String>, rtt: f64, bandwidth_up: f64, bandwidth_down: f64) -> Self {
        Self {
            name: name.into(),
            rtt,
            bandwidth_up,
            bandwidth_down,
            category: None,
            weight: default_weight(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>, weight: f64) -> Self {
        self.category = Some(category.into());
        self.weight = weight;
        self
    }

    /// Time for one round trip carrying the given bytes in each direction.
    pub fn round_time(&self, request_bytes: u64, response_bytes: u64) -> f64 {
        self.rtt
            + request_bytes as f64 / self.bandwidth_up
            + response_bytes as f64 / self.bandwidth_down
    }
}

const TIERS: [(&str, f64); 5] = [
    ("slowest", 0.05),
    ("slow", 0.20),
    ("median", 0.50),
    ("fast", 0.20),
    ("fastest", 0.05),
];

// (name prefix, category, [(rtt, bandwidth); one per tier])
const PROFILES: [(&str, &str, [(f64, f64); 5]); 5] = [
    (
        "mobile_2g",
        "2G",
        [(10000.0, 4.0), (4500.0, 6.0), (2750.0, 9.0), (1500.0, 19.0), (125.0, 200.0)],
    ),
    (
        "mobile_3g",
        "3G",
        [(2750.0, 13.0), (550.0, 50.0), (300.0, 156.0), (175.0, 219.0), (115.0, 750.0)],
    ),
    (
        "mobile_4g",
        "4G",
        [(650.0, 47.0), (225.0, 181.0), (150.0, 238.0), (110.0, 750.0), (70.0, 2250.0)],
    ),
    (
        "mobile_wifi",
        "WiFi",
        [(500.0, 100.0), (170.0, 200.0), (115.0, 563.0), (65.0, 1250.0), (35.0, 3438.0)],
    ),
    (
        "desktop",
        "Desktop",
        [(350.0, 125.0), (150.0, 313.0), (80.0, 938.0), (50.0, 2188.0), (20.0, 7500.0)],
    ),
];

/// The standard set of 25 models: five tiers for each of 2G, 3G, 4G, WiFi and desktop.
pub fn standard_models() -> Vec<NetworkModel> {
    PROFILES
        .iter()
        .flat_map(|(prefix, category, tiers)| {
            tiers
                .iter()
                .zip(TIERS)
                .map(move |(&(rtt, bandwidth), (tier, weight))| {
                    NetworkModel::new(format!("{prefix}_{tier}"), rtt, bandwidth, bandwidth)
                        .with_category(*category, weight)
                })
        })
        .collect()
}
