use serde::{Deserialize, Serialize};

/// Scheduler output for one (graph, network model) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphTotal {
    /// Elapsed time in ms.
    pub total_time: f64,
    pub request_bytes: u64,
    pub response_bytes: u64,
    pub num_requests: u64,
}

impl GraphTotal {
    pub fn total_bytes(&self) -> u64 {
        self.request_bytes + self.response_bytes
    }
}

/// One [`GraphTotal`] per page view of a sequence, in page view order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTotals {
    /// Index of the originating sequence in the input corpus.
    pub sequence_id: usize,
    pub totals: Vec<GraphTotal>,
}

impl SequenceTotals {
    pub fn new(sequence_id: usize, totals: Vec<GraphTotal>) -> Self {
        Self {
            sequence_id,
            totals,
        }
    }

    pub fn total_time(&self) -> f64 {
        self.totals.iter().map(|t| t.total_time).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.totals.iter().map(GraphTotal::total_bytes).sum()
    }
}
