//! Drives methods over page view sequences and collects per-sequence totals.
//!
//! Sequences are split into contiguous segments, one per worker. Workers share
//! nothing mutable: each opens its own font store and size cache from an
//! explicit [`WorkerConfig`] and returns a [`PartialResults`]. The partials are
//! merged in segment order, so the final mapping does not depend on which
//! worker finished first.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use pfe_sim_abstract::{
    FontStore, MethodEntry, NetworkModel, NetworkSensitivity, PageViewSequence, RequestGraph,
    Result, SequenceTotals, SessionResources, SimError, SizeCache, WorkerConfig,
};
use tracing::{debug, info, warn};

use crate::engine::totals_for_network;
use crate::error::DriverError;

/// Network model name -> one entry per surviving sequence.
pub type ResultsByNetwork = BTreeMap<String, Vec<SequenceTotals>>;

/// Method name -> per network results.
pub type ResultsByMethod = BTreeMap<String, ResultsByNetwork>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResults {
    pub by_method: ResultsByMethod,
    /// Global indices of sequences dropped because simulating them failed.
    pub failed_indices: Vec<usize>,
}

/// A contiguous run of sequences handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// What one worker produces for its segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResults {
    pub segment: Segment,
    pub by_method: ResultsByMethod,
    /// Failed sequence indices relative to the start of the segment.
    pub failed_local: Vec<usize>,
}

/// Split `len` sequences into at most `workers` contiguous, non-empty segments.
pub fn partition(len: usize, workers: usize) -> Vec<Segment> {
    let workers = workers.max(1);
    let size = len.div_ceil(workers).max(1);
    (0..len)
        .step_by(size)
        .enumerate()
        .map(|(index, start)| Segment {
            index,
            start,
            end: (start + size).min(len),
        })
        .collect()
}

impl SimulationResults {
    /// Merge worker partials. Total lists are concatenated in segment order and
    /// local failure indices are rebased onto the segment start.
    pub fn merge(partials: impl IntoIterator<Item = PartialResults>) -> Self {
        let mut partials: Vec<_> = partials.into_iter().collect();
        partials.sort_by_key(|p| p.segment.start);

        let mut merged = Self::default();
        for partial in partials {
            merged.absorb(partial);
        }
        merged.failed_indices.sort_unstable();
        merged
    }

    fn absorb(&mut self, partial: PartialResults) {
        for (method, networks) in partial.by_method {
            let method_results = self.by_method.entry(method).or_default();
            for (network, totals) in networks {
                method_results.entry(network).or_default().extend(totals);
            }
        }
        let offset = partial.segment.start;
        self.failed_indices
            .extend(partial.failed_local.into_iter().map(|local| offset + local));
    }

    pub fn dropped_sequence_count(&self) -> usize {
        self.failed_indices.len()
    }
}

/// The simulation matrix: methods x network models over a set of sequences.
pub struct Simulation<'a> {
    methods: &'a [MethodEntry],
    network_models: &'a [NetworkModel],
}

impl<'a> Simulation<'a> {
    pub fn new(methods: &'a [MethodEntry], network_models: &'a [NetworkModel]) -> Self {
        Self {
            methods,
            network_models,
        }
    }

    /// Run every sequence on `workers` threads. `open_store` is called once
    /// inside each worker to build its private font store.
    pub fn run<S, F>(
        &self,
        sequences: &[PageViewSequence],
        workers: usize,
        worker_config: &WorkerConfig,
        open_store: F,
    ) -> std::result::Result<SimulationResults, DriverError>
    where
        S: FontStore,
        F: Fn(&WorkerConfig) -> S + Sync,
    {
        let segments = partition(sequences.len(), workers);
        info!(
            "Simulating {} sequence(s) x {} method(s) x {} network model(s) on {} worker(s)",
            sequences.len(),
            self.methods.len(),
            self.network_models.len(),
            segments.len()
        );

        let open_store = &open_store;
        let partials = thread::scope(|scope| {
            let handles: Vec<_> = segments
                .iter()
                .map(|&segment| {
                    let config = worker_config.clone();
                    let slice = &sequences[segment.start..segment.end];
                    scope.spawn(move || {
                        let store = open_store(&config);
                        let sizes = SizeCache::new();
                        let resources = SessionResources::new(&store, &sizes);
                        self.simulate_segment(slice, segment, resources)
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(&segments)
                .map(|(handle, segment)| {
                    handle.join().map_err(|_| DriverError::WorkerPanicked {
                        segment: segment.index,
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        })?;

        let results = SimulationResults::merge(partials);
        if !results.failed_indices.is_empty() {
            warn!(
                "{} sequence(s) failed and were dropped: {:?}",
                results.failed_indices.len(),
                results.failed_indices
            );
        }
        Ok(results)
    }

    /// Simulate one segment sequentially. Failures are isolated per sequence.
    pub fn simulate_segment(
        &self,
        sequences: &[PageViewSequence],
        segment: Segment,
        resources: SessionResources<'_>,
    ) -> PartialResults {
        debug!(
            "Worker {} simulating sequences [{}, {})",
            segment.index, segment.start, segment.end
        );
        let mut by_method = ResultsByMethod::new();
        let mut failed_local = Vec::new();

        for (local, sequence) in sequences.iter().enumerate() {
            let sequence_id = segment.start + local;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.simulate_sequence(sequence, sequence_id, resources)
            }));
            match outcome.unwrap_or_else(|payload| Err(panic_error(payload.as_ref()))) {
                Ok(per_method) => {
                    for (method, networks) in per_method {
                        let method_results: &mut ResultsByNetwork =
                            by_method.entry(method).or_default();
                        for (network, totals) in networks {
                            method_results.entry(network).or_default().push(totals);
                        }
                    }
                }
                Err(err) => {
                    warn!("Dropping sequence {}: {}", sequence_id, err);
                    failed_local.push(local);
                }
            }
        }

        PartialResults {
            segment,
            by_method,
            failed_local,
        }
    }

    /// Simulate one sequence with every method. Any failure drops the sequence
    /// for all methods so the per-method result sets stay aligned.
    pub fn simulate_sequence(
        &self,
        sequence: &PageViewSequence,
        sequence_id: usize,
        resources: SessionResources<'_>,
    ) -> Result<BTreeMap<String, BTreeMap<String, SequenceTotals>>> {
        let mut per_method = BTreeMap::new();
        for entry in self.methods {
            let mut per_network = BTreeMap::new();
            match entry.sensitivity() {
                NetworkSensitivity::Sensitive => {
                    for model in self.network_models {
                        let graphs = simulate_method(entry, sequence, Some(model), resources)?;
                        let totals = totals_for_network(&graphs, model)?;
                        per_network
                            .insert(model.name.clone(), SequenceTotals::new(sequence_id, totals));
                    }
                }
                NetworkSensitivity::Insensitive => {
                    let graphs = simulate_method(entry, sequence, None, resources)?;
                    for model in self.network_models {
                        let totals = totals_for_network(&graphs, model)?;
                        per_network
                            .insert(model.name.clone(), SequenceTotals::new(sequence_id, totals));
                    }
                }
            }
            per_method.insert(entry.name().to_string(), per_network);
        }
        Ok(per_method)
    }
}

/// A panic inside one sequence's simulation fails that sequence only.
fn panic_error(payload: &(dyn Any + Send)) -> SimError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    SimError::Panicked { message }
}

/// Feed a sequence through a fresh session and return one graph per page view.
fn simulate_method(
    entry: &MethodEntry,
    sequence: &PageViewSequence,
    network_model: Option<&NetworkModel>,
    resources: SessionResources<'_>,
) -> Result<Vec<RequestGraph>> {
    let mut session = entry.method().start_session(network_model, resources)?;
    for page_view in &sequence.page_views {
        session.page_view(&page_view.usage_by_font())?;
    }

    let graphs = session.request_graphs();
    if graphs.len() != sequence.page_views.len() {
        return Err(SimError::Session {
            method: entry.name().to_string(),
            message: format!(
                "produced {} request graph(s) for {} page view(s)",
                graphs.len(),
                sequence.page_views.len()
            ),
        });
    }
    Ok(graphs.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even_and_uneven() {
        assert_eq!(
            partition(5, 2),
            vec![
                Segment {
                    index: 0,
                    start: 0,
                    end: 3
                },
                Segment {
                    index: 1,
                    start: 3,
                    end: 5
                },
            ]
        );
        assert_eq!(partition(4, 4).len(), 4);
        assert!(partition(3, 8).iter().all(|s| s.len() == 1));
        assert_eq!(partition(3, 8).len(), 3);
        assert!(partition(0, 3).is_empty());
        assert_eq!(partition(7, 0).len(), 1);
    }

    #[test]
    fn test_merge_rebases_failures_in_segment_order() {
        let late = PartialResults {
            segment: Segment {
                index: 1,
                start: 4,
                end: 8,
            },
            by_method: ResultsByMethod::new(),
            failed_local: vec![0, 3],
        };
        let early = PartialResults {
            segment: Segment {
                index: 0,
                start: 0,
                end: 4,
            },
            by_method: ResultsByMethod::new(),
            failed_local: vec![2],
        };

        let merged = SimulationResults::merge([late, early]);
        assert_eq!(merged.failed_indices, vec![2, 4, 7]);
        assert_eq!(merged.dropped_sequence_count(), 3);
    }
}
