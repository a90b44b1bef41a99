//! Lookup Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input does not look like an ISBN-13 or ISBN-10.
    #[display("{_0} does not appear to be an isbn13 or isbn10")]
    InvalidIsbn(#[error(not(source))] String),
    /// Input does not look like an Open Library edition identifier.
    #[display("{_0} does not appear to be an edition olid")]
    InvalidOlid(#[error(not(source))] String),
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[display("network error")]
    Network,
    /// The service answered, but has no record at the requested key.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The service answered with a non-success status code.
    #[display("unexpected status {_0} while looking up {_1}")]
    Status(#[error(not(source))] u16, #[error(not(source))] String),
    /// The response body could not be decoded.
    #[display("malformed payload for {_0}")]
    Payload(#[error(not(source))] String),
    /// A resolved record is missing a field the catalog requires.
    #[display("invalid record: missing {_0}")]
    InvalidRecord(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status(code, _) => *code >= 500 || *code == 429,
            _ => false,
        }
    }

    /// Returns `true` if the error was caused by the input rather than by the
    /// service or the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidIsbn(_) | Self::InvalidOlid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Network, true)]
    #[case(ErrorKind::Status(503, "/isbn/1.json".to_string()), true)]
    #[case(ErrorKind::Status(429, "/isbn/1.json".to_string()), true)]
    #[case(ErrorKind::Status(403, "/isbn/1.json".to_string()), false)]
    #[case(ErrorKind::NotFound("/isbn/1.json".to_string()), false)]
    #[case(ErrorKind::Payload("/isbn/1.json".to_string()), false)]
    fn test_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}
