use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use pfe_sim_abstract::{BucketConfig, NetworkModel, SequenceTotals, SimConfig};
use tracing::info;

use crate::codec;
use crate::cost::CostFunction;
use crate::distribution::{Bucket, Distribution, LinearBucketer};
use crate::driver::{ResultsByNetwork, SimulationResults};
use crate::error::ReportError;
use crate::rollup::{CategorySeries, category_rollup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Pretty-printed JSON.
    #[default]
    Text,
    Binary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub network_model_name: String,
    pub total_cost: f64,
    pub total_wait_time_ms: f64,
    pub total_request_bytes: u64,
    pub total_response_bytes: u64,
    pub total_request_count: u64,
    pub wait_per_page_view: DistributionReport,
    pub cost_per_page_view: DistributionReport,
    pub request_bytes_per_page_view: DistributionReport,
    pub response_bytes_per_page_view: DistributionReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCategoryReport {
    pub category: String,
    pub cost_per_sequence: Vec<f64>,
    pub bytes_per_sequence: Vec<f64>,
    pub sequence_ids: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodReport {
    pub method_name: String,
    pub results_by_network: Vec<NetworkReport>,
    #[serde(default)]
    pub results_by_network_category: Vec<NetworkCategoryReport>,
}

/// Final output of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub dropped_sequence_count: usize,
    pub failed_sequences: Vec<usize>,
    pub methods: Vec<MethodReport>,
}

impl From<CategorySeries> for NetworkCategoryReport {
    fn from(series: CategorySeries) -> Self {
        Self {
            category: series.category,
            cost_per_sequence: series.cost_per_sequence,
            bytes_per_sequence: series.bytes_per_sequence,
            sequence_ids: series.sequence_ids,
        }
    }
}

impl AnalysisReport {
    pub fn to_text(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        codec::encode(self).to_vec()
    }

    pub fn from_binary(data: &[u8]) -> Result<Self, ReportError> {
        codec::decode(data)
    }

    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<(), ReportError> {
        let data = match format {
            ReportFormat::Text => self.to_text()?.into_bytes(),
            ReportFormat::Binary => self.to_binary(),
        };
        fs::write(path, data)?;
        info!("Wrote {:?} report to {}", format, path.display());
        Ok(())
    }

    pub fn read(path: &Path, format: ReportFormat) -> Result<Self, ReportError> {
        match format {
            ReportFormat::Text => Self::from_text(&fs::read_to_string(path)?),
            ReportFormat::Binary => Self::from_binary(&fs::read(path)?),
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodReport> {
        self.methods.iter().find(|m| m.method_name == name)
    }
}

impl MethodReport {
    pub fn network(&self, name: &str) -> Option<&NetworkReport> {
        self.results_by_network
            .iter()
            .find(|n| n.network_model_name == name)
    }
}

/// Turns simulation results into an [`AnalysisReport`].
pub struct ReportBuilder<'a> {
    network_models: &'a [NetworkModel],
    cost: CostFunction,
    buckets: BucketConfig,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a SimConfig) -> Self {
        Self {
            network_models: &config.network_models,
            cost: CostFunction::new(config.cost),
            buckets: config.buckets,
        }
    }

    pub fn build(&self, results: &SimulationResults) -> Result<AnalysisReport, ReportError> {
        let methods = results
            .by_method
            .iter()
            .map(|(method_name, by_network)| self.method_report(method_name, by_network))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AnalysisReport {
            dropped_sequence_count: results.failed_indices.len(),
            failed_sequences: results.failed_indices.clone(),
            methods,
        })
    }

    fn method_report(
        &self,
        method_name: &str,
        by_network: &ResultsByNetwork,
    ) -> Result<MethodReport, ReportError> {
        let results_by_network = by_network
            .iter()
            .map(|(network, totals)| self.network_report(network, totals))
            .collect();
        let results_by_network_category =
            category_rollup(by_network, self.network_models, &self.cost)?
                .into_iter()
                .map(NetworkCategoryReport::from)
                .collect();

        Ok(MethodReport {
            method_name: method_name.to_string(),
            results_by_network,
            results_by_network_category,
        })
    }

    fn network_report(&self, network: &str, sequences: &[SequenceTotals]) -> NetworkReport {
        let mut wait = Distribution::new(LinearBucketer::new(self.buckets.wait_time_ms));
        let mut cost = Distribution::new(LinearBucketer::new(self.buckets.cost));
        let mut request_bytes = Distribution::new(LinearBucketer::new(self.buckets.request_bytes));
        let mut response_bytes =
            Distribution::new(LinearBucketer::new(self.buckets.response_bytes));

        let mut report = NetworkReport {
            network_model_name: network.to_string(),
            total_cost: 0.0,
            total_wait_time_ms: 0.0,
            total_request_bytes: 0,
            total_response_bytes: 0,
            total_request_count: 0,
            wait_per_page_view: DistributionReport::default(),
            cost_per_page_view: DistributionReport::default(),
            request_bytes_per_page_view: DistributionReport::default(),
            response_bytes_per_page_view: DistributionReport::default(),
        };

        for total in sequences.iter().flat_map(|s| &s.totals) {
            let page_cost = self.cost.cost(total.total_time);
            report.total_cost += page_cost;
            report.total_wait_time_ms += total.total_time;
            report.total_request_bytes += total.request_bytes;
            report.total_response_bytes += total.response_bytes;
            report.total_request_count += total.num_requests;

            wait.add_value(total.total_time);
            cost.add_value(page_cost);
            request_bytes.add_value(total.request_bytes as f64);
            response_bytes.add_value(total.response_bytes as f64);
        }

        report.wait_per_page_view.buckets = wait.snapshot();
        report.cost_per_page_view.buckets = cost.snapshot();
        report.request_bytes_per_page_view.buckets = request_bytes.snapshot();
        report.response_bytes_per_page_view.buckets = response_bytes.snapshot();
        report
    }
}
