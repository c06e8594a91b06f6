use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode entity: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed entry in {path:?} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Reasons an entity is rejected before it enters the domain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duration must not be negative")]
    NegativeDuration,

    #[error("{0} must not be empty")]
    MissingField(&'static str),
}
