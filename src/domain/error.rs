use thiserror::Error;

/// Failure while replaying the event log. Any error aborts the query that consumed the replay, no
/// partial result is produced.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("malformed event at line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },

    #[error("failed to read event log: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            line,
            reason: reason.into(),
        }
    }
}
