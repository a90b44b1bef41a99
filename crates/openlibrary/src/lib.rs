//! Open Library lookups.
//!
//! Turns an ISBN (or an edition identifier) into a fully resolved [`Book`]:
//! the edition record, upgraded with data from its parent work where that is
//! unambiguous, and every author resolved to a display name.
//!
//! # Architecture
//! - [`models`]: the catalog-facing types ([`Book`], [`Author`], identifiers).
//! - [`source`]: raw record access behind the [`Source`] trait, with the
//!   HTTP implementation [`OpenLibrary`](source::OpenLibrary).
//! - [`work`]: edition/work arbitration.
//! - [`lookup`]: the composition of the above.

pub mod error;
mod lookup;
pub mod models;
pub mod source;
pub mod work;

pub use crate::lookup::{lookup, lookup_by_edition, lookup_by_isbn};
pub use crate::models::{Author, Book};
pub use crate::source::{ORIGIN, Source, USER_AGENT};
