//! Moving books in and out of the catalog.
//!
//! - [`import`]: resolve identifiers through a lookup [`Source`](shelf_openlibrary::Source)
//!   and reconcile them into a [`Repository`](shelf_catalog::Repository).
//! - [`export`]: render the catalog as CSV.

pub mod error;
pub mod export;
pub mod import;
