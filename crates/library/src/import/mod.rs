//! Batch import of identifiers into the catalog.
//!
//! Input is line oriented: one identifier per line, all in the same
//! [`Format`]. Every line is validated, looked up and reconciled on its own,
//! so a bad line only costs itself. Failed lines can be collected verbatim
//! into an "exceptions" output by [`run`], ready to be retried later.
//!
//! The primary entry point is [`import`], which streams an [`ImportEvent`]
//! per line. [`run`] drives that stream to completion and returns the
//! [`Summary`]; [`import_line`] handles a single identifier.

pub mod error;
mod line;
mod stream;

pub use self::line::{Format, Outcome, import_line};
pub use self::stream::{ImportEvent, Summary, import, run};
