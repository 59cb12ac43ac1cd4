//! Error types for the annotation pipeline

use std::fmt;

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum Error {
    /// Selection too short, or malformed offsets on create
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Stale(#[from] StaleHighlight),

    /// Navigation target or stored record absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Opaque failure from the backing store; never retried here
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("HTML parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Errors caused by the caller's input rather than by the environment
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound(_))
    }
}

/// Why a stored highlight could not be re-projected onto content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// `end_offset` is past the end of the flattened text
    OutOfBounds { text_len: usize },
    /// `end_offset <= start_offset`
    EmptyRange,
    /// The text at the recorded offsets differs from the stored text
    TextMismatch { found: String },
    /// The range intersects a marker that was already applied
    Overlap,
    /// The content itself could not be parsed
    Unparseable,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::OutOfBounds { text_len } => {
                write!(f, "range exceeds content length {}", text_len)
            }
            StaleReason::EmptyRange => write!(f, "empty or inverted range"),
            StaleReason::TextMismatch { found } => write!(f, "content reads {:?}", found),
            StaleReason::Overlap => write!(f, "overlaps an applied highlight"),
            StaleReason::Unparseable => write!(f, "content could not be parsed"),
        }
    }
}

/// A highlight whose stored text no longer matches the content at its offsets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Stale highlight {id} at {start_offset}..{end_offset}: {reason}")]
pub struct StaleHighlight {
    pub id: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub reason: StaleReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_message() {
        let stale = StaleHighlight {
            id: "h1".to_string(),
            start_offset: 3,
            end_offset: 8,
            reason: StaleReason::TextMismatch {
                found: "other".to_string(),
            },
        };
        let err = Error::from(stale);
        assert_eq!(
            err.to_string(),
            "Stale highlight h1 at 3..8: content reads \"other\""
        );
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_errors() {
        assert!(Error::Validation("short".into()).is_user_error());
        assert!(Error::NotFound("h9".into()).is_user_error());
        assert!(!Error::Parse("bad".into()).is_user_error());
    }
}
