use thiserror::Error;

/// Failures attributable to a single simulated sequence.
///
/// The driver recovers from every variant by dropping the sequence.
#[derive(Debug, Error)]
pub enum SimError {
    /// The happens-after relation has a cycle or points outside the graph.
    #[error("request graph cannot complete: {remaining} request(s) have unsatisfiable dependencies")]
    GraphHasCycles { remaining: usize },

    /// A builder was handed a request handle it did not issue.
    #[error("request {index} does not belong to this graph")]
    ForeignRequest { index: usize },

    #[error("font '{font_id}' not found")]
    FontNotFound { font_id: String },

    #[error("failed to read font '{font_id}': {source}")]
    FontIo {
        font_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{method} session failed: {message}")]
    Session { method: String, message: String },

    /// A method panicked while simulating the sequence.
    #[error("simulation panicked: {message}")]
    Panicked { message: String },
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
