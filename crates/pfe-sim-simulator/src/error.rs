use thiserror::Error;

/// Errors that break a whole run rather than a single sequence.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("worker for segment {segment} panicked")]
    WorkerPanicked { segment: usize },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("not a report file: bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported report version {0}")]
    UnsupportedVersion(u8),

    #[error("report truncated: needed {needed} byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("{0} trailing byte(s) after report")]
    TrailingBytes(usize),

    #[error("invalid UTF-8 in report string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("text report error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("series length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("sequence ids differ in {context}")]
    SequenceIdMismatch { context: String },

    #[error("method '{0}' appears in more than one run")]
    DuplicateMethod(String),

    #[error("report contains no method results")]
    Empty,
}
