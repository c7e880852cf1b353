use std::collections::BTreeMap;

use pfe_sim_abstract::{NetworkModel, SequenceTotals};

use crate::cost::CostFunction;
use crate::driver::ResultsByNetwork;
use crate::error::ReportError;

/// Expected per-sequence cost and bytes under a mix of network models.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub cost_per_sequence: Vec<f64>,
    pub bytes_per_sequence: Vec<f64>,
    pub sequence_ids: Vec<usize>,
}

/// Sum of page view costs for one sequence.
pub fn sequence_cost(totals: &SequenceTotals, cost: &CostFunction) -> f64 {
    totals.totals.iter().map(|t| cost.cost(t.total_time)).sum()
}

/// Weight and sum the per-sequence series of every model sharing a category.
///
/// Models without a category are skipped. All models of a category must
/// cover the same sequences in the same order.
pub fn category_rollup(
    by_network: &ResultsByNetwork,
    network_models: &[NetworkModel],
    cost: &CostFunction,
) -> Result<Vec<CategorySeries>, ReportError> {
    let mut series: BTreeMap<&str, CategorySeries> = BTreeMap::new();

    for model in network_models {
        let Some(category) = model.category.as_deref() else {
            continue;
        };
        let totals = by_network
            .get(&model.name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let sequence_ids: Vec<usize> = totals.iter().map(|t| t.sequence_id).collect();

        let entry = series.entry(category).or_insert_with(|| CategorySeries {
            category: category.to_string(),
            cost_per_sequence: vec![0.0; totals.len()],
            bytes_per_sequence: vec![0.0; totals.len()],
            sequence_ids: sequence_ids.clone(),
        });

        if entry.sequence_ids.len() != sequence_ids.len() {
            return Err(ReportError::LengthMismatch {
                context: format!("category {category}, network {}", model.name),
                expected: entry.sequence_ids.len(),
                actual: sequence_ids.len(),
            });
        }
        if entry.sequence_ids != sequence_ids {
            return Err(ReportError::SequenceIdMismatch {
                context: format!("category {category}, network {}", model.name),
            });
        }

        for (i, sequence) in totals.iter().enumerate() {
            entry.cost_per_sequence[i] += model.weight * sequence_cost(sequence, cost);
            entry.bytes_per_sequence[i] += model.weight * sequence.total_bytes() as f64;
        }
    }

    Ok(series.into_values().collect())
}
