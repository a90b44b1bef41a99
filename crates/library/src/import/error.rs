//! Error types for the [`import`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an import failure.
///
/// ### Per-line Errors
/// - [`ErrorKind::Validation`]
/// - [`ErrorKind::Lookup`]
/// - [`ErrorKind::Catalog`]
///
/// ### Fatal Errors
/// - [`ErrorKind::Io`] - reading the input or writing the exceptions output
///   failed; the rest of the batch cannot be processed.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The line is not a recognisable identifier for the chosen format.
    #[display("not a valid identifier")]
    Validation,
    /// The lookup service could not resolve the identifier.
    #[display("lookup failed")]
    Lookup,
    /// The resolved book could not be written to the catalog.
    #[display("catalog update failed")]
    Catalog,
    #[display("i/o error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Only ever `false`: whether a [`Lookup`](Self::Lookup) failure is
    /// transient is decided by the lookup error underneath it.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
