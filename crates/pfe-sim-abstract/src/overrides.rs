use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::{ConfigError, SimConfig};
use crate::network::NetworkModel;

/// Run configuration as read from a TOML file. Only the fields present are applied.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SimConfigOverride {
    pub cost: Option<CostOverride>,
    pub buckets: Option<BucketOverride>,
    pub workers: Option<usize>,
    pub network_models: Option<Vec<NetworkModel>>,
    pub default_font_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct CostOverride {
    pub no_cost_threshold_ms: Option<f64>,
    pub timeout_threshold_ms: Option<f64>,
    pub max_cost: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BucketOverride {
    pub wait_time_ms: Option<u64>,
    pub cost: Option<u64>,
    pub request_bytes: Option<u64>,
    pub response_bytes: Option<u64>,
}

impl SimConfigOverride {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(cost) = &self.cost {
            if let Some(v) = cost.no_cost_threshold_ms {
                config.cost.no_cost_threshold_ms = v;
            }
            if let Some(v) = cost.timeout_threshold_ms {
                config.cost.timeout_threshold_ms = v;
            }
            if let Some(v) = cost.max_cost {
                config.cost.max_cost = v;
            }
        }
        if let Some(buckets) = &self.buckets {
            if let Some(v) = buckets.wait_time_ms {
                config.buckets.wait_time_ms = v;
            }
            if let Some(v) = buckets.cost {
                config.buckets.cost = v;
            }
            if let Some(v) = buckets.request_bytes {
                config.buckets.request_bytes = v;
            }
            if let Some(v) = buckets.response_bytes {
                config.buckets.response_bytes = v;
            }
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(models) = &self.network_models {
            config.network_models = models.clone();
        }
        if let Some(id) = &self.default_font_id {
            config.default_font_id = Some(id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let overrides = SimConfigOverride::from_toml_str(
            r#"
workers = 4

[cost]
max_cost = 10.0

[[network_models]]
name = "lab_fast"
rtt = 20.0
bandwidth_up = 100.0
bandwidth_down = 1000.0
category = "Lab"
weight = 0.5
"#,
        )
        .unwrap();

        let mut config = SimConfig::default();
        overrides.apply_to(&mut config);

        assert_eq!(config.workers, 4);
        assert_eq!(config.cost.max_cost, 10.0);
        assert_eq!(config.cost.no_cost_threshold_ms, 100.0);
        assert_eq!(config.buckets, Default::default());
        assert_eq!(config.network_models.len(), 1);
        assert_eq!(config.network_models[0].category.as_deref(), Some("Lab"));
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SimConfigOverride::from_toml_str("wokers = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
