//! Error types for the gorecall crate

use thiserror::Error;

/// Main error type for the gorecall crate.
///
/// Coordinate anomalies (passes, off-board points) are never errors; they
/// are skipped where they are used.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed SGF at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("no game found in SGF")]
    NoGame,

    #[error("failed to {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed")]
    Serialization(#[from] serde_json::Error),

    #[error("storage quota exceeded: capacity is {capacity} sequences")]
    QuotaExceeded { capacity: usize },

    #[error("failed to write sequence '{key}'")]
    SequenceWrite {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("sequence key '{key}' already holds a sequence from '{owner}'")]
    KeyConflict { key: String, owner: String },

    #[error("sequence '{key}' not found")]
    NotFound { key: String },

    #[error("invalid {what} '{value}'")]
    InvalidArgument { what: &'static str, value: String },
}

impl Error {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            message: message.into(),
        }
    }
}

/// Result type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_io_cause_is_reported_once() {
        let err = Error::io("read settings.json", std::io::Error::other("disk on fire"));
        assert_eq!(err.to_string(), "failed to read settings.json");
        let cause = err.source().map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("disk on fire"));

        let chained = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chained.matches("disk on fire").count(), 1);
    }

    #[test]
    fn test_sequence_write_keeps_cause_in_source() {
        let err = Error::SequenceWrite {
            key: "seq:a.sgf:3".into(),
            source: Box::new(Error::QuotaExceeded { capacity: 2 }),
        };
        assert_eq!(err.to_string(), "failed to write sequence 'seq:a.sgf:3'");
        let cause = err.source().map(ToString::to_string);
        assert_eq!(
            cause.as_deref(),
            Some("storage quota exceeded: capacity is 2 sequences")
        );
    }
}
