//! Record sources.
//!
//! A [`Source`] fetches the three raw record types (editions, works and
//! authors) that a book lookup is assembled from. The assembly itself, and the
//! arbitration between edition and work data, lives in
//! [`lookup`](crate::lookup) so that every source gets identical semantics.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod payload;

pub use self::http::{ORIGIN, OpenLibrary, OpenLibraryBuilder, USER_AGENT};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockSource;
pub use self::payload::{AuthorRecord, Edition, Reference, Work, WorkAuthor};
use crate::error::Result;
use crate::models::Query;
use async_trait::async_trait;

/// Raw record access, one request per call.
///
/// Implementations must not retry: a failed fetch surfaces immediately and
/// fails the whole lookup it belongs to.
#[async_trait]
pub trait Source: Send + Sync {
    /// Name of the source (used for logging only).
    fn name(&self) -> &str;

    /// Fetch the edition record addressed by an ISBN or edition identifier.
    async fn edition(&self, query: &Query) -> Result<Edition>;

    /// Fetch a work record by key (e.g. `/works/OL61982W`).
    async fn work(&self, key: &str) -> Result<Work>;

    /// Fetch an author record by key (e.g. `/authors/OL12345A`).
    async fn author(&self, key: &str) -> Result<AuthorRecord>;
}
