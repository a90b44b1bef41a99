//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("invalid argument")]
    Argument,
    #[display("catalog error")]
    Catalog,
    #[display("lookup error")]
    Lookup,
    #[display("import failed")]
    Import,
    #[display("export failed")]
    Export,
    #[display("i/o error on {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}
