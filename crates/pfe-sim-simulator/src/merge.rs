//! Combine reports from several runs over the same corpus.
//!
//! Runs usually cover disjoint sets of methods. A sequence that failed in any
//! run is removed from the category series of every other run, then the
//! merged report is validated so every series covers the same sequences.

use std::collections::{BTreeSet, HashSet};

use tracing::info;

use crate::error::ReportError;
use crate::report::AnalysisReport;

/// Check that every category series has consistent lengths and the same sequence ids.
pub fn validate(report: &AnalysisReport) -> Result<(), ReportError> {
    if report.methods.is_empty() {
        return Err(ReportError::Empty);
    }

    let mut expected_ids: Option<&[usize]> = None;
    for method in &report.methods {
        for category in &method.results_by_network_category {
            let context = format!("{} / {}", method.method_name, category.category);
            let len = category.sequence_ids.len();
            for actual in [
                category.cost_per_sequence.len(),
                category.bytes_per_sequence.len(),
            ] {
                if actual != len {
                    return Err(ReportError::LengthMismatch {
                        context,
                        expected: len,
                        actual,
                    });
                }
            }

            match expected_ids {
                None => expected_ids = Some(&category.sequence_ids),
                Some(expected) if expected.len() != len => {
                    return Err(ReportError::LengthMismatch {
                        context,
                        expected: expected.len(),
                        actual: len,
                    });
                }
                Some(expected) if expected != category.sequence_ids.as_slice() => {
                    return Err(ReportError::SequenceIdMismatch { context });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

pub fn merge_reports(runs: Vec<AnalysisReport>) -> Result<AnalysisReport, ReportError> {
    for run in &runs {
        validate(run)?;
    }

    let global_failures: BTreeSet<usize> = runs
        .iter()
        .flat_map(|run| run.failed_sequences.iter().copied())
        .collect();

    let mut merged = AnalysisReport {
        dropped_sequence_count: global_failures.len(),
        failed_sequences: global_failures.iter().copied().collect(),
        methods: Vec::new(),
    };
    let mut seen_methods = HashSet::new();

    for mut run in runs {
        let own: BTreeSet<usize> = run.failed_sequences.iter().copied().collect();
        let foreign: BTreeSet<usize> = global_failures.difference(&own).copied().collect();
        info!(
            "Merging {} method(s), removing {} sequence(s) failed elsewhere",
            run.methods.len(),
            foreign.len()
        );

        for method in &mut run.methods {
            if !seen_methods.insert(method.method_name.clone()) {
                return Err(ReportError::DuplicateMethod(method.method_name.clone()));
            }
            for category in &mut method.results_by_network_category {
                let keep: Vec<bool> = category
                    .sequence_ids
                    .iter()
                    .map(|id| !foreign.contains(id))
                    .collect();
                retain_by_mask(&mut category.cost_per_sequence, &keep);
                retain_by_mask(&mut category.bytes_per_sequence, &keep);
                retain_by_mask(&mut category.sequence_ids, &keep);
            }
        }
        merged.methods.append(&mut run.methods);
    }

    validate(&merged)?;
    Ok(merged)
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}
