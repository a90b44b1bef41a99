//! SQLite catalog of books and authors.
//!
//! The catalog is the persistent half of the system: looked-up books are
//! reconciled into it, corrected in place, and exported from it.
//!
//! # Architecture
//! The catalog stores three tables:
//! - **Books**: keyed by their Open Library edition key. The looked-up title
//!   is kept verbatim; user corrections live in a separate override column.
//! - **Authors**: keyed by their Open Library author key, shared by every
//!   book that lists them.
//! - **Associations**: ordered (book, author) pairs.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::repo::{Counts, Entry, Reconciled, Repository};
