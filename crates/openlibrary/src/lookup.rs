//! Book lookup: edition fetch, work arbitration and author resolution.

use crate::error::Result;
use crate::models::{Author, Book, EditionId, Isbn, IsbnList, Query};
use crate::source::{Edition, Source};
use crate::work;
use tracing::instrument;

/// Look up a book by ISBN.
pub async fn lookup_by_isbn(source: &dyn Source, isbn: &Isbn) -> Result<Book> {
    lookup(source, &Query::Isbn(isbn.clone())).await
}

/// Look up a book by its edition identifier.
pub async fn lookup_by_edition(source: &dyn Source, id: &EditionId) -> Result<Book> {
    lookup(source, &Query::Edition(id.clone())).await
}

/// Resolve a query into a complete [`Book`].
///
/// 1. Fetch the edition.
/// 2. If it belongs to exactly one work, let the work improve the title and
///    replace the author list (see [`work`]).
/// 3. Fetch every remaining author reference for its display name.
///
/// Any failed request fails the whole lookup; a book is never returned with
/// a partially resolved author list.
#[instrument(skip(source), fields(source = source.name()))]
pub async fn lookup(source: &dyn Source, query: &Query) -> Result<Book> {
    let mut edition = source.edition(query).await?;
    work::resolve(source, &mut edition).await?;
    let authors = resolve_authors(source, &edition).await?;
    let book = Book {
        olid: edition.key,
        title: edition.title,
        isbn_13: IsbnList::new(edition.isbn_13),
        isbn_10: IsbnList::new(edition.isbn_10),
        authors,
    };
    book.validate()?;
    tracing::debug!(olid = %book.olid, title = %book.title, authors = book.authors.len(), "Resolved book");
    Ok(book)
}

async fn resolve_authors(source: &dyn Source, edition: &Edition) -> Result<Vec<Author>> {
    let mut authors = Vec::with_capacity(edition.authors.len());
    for reference in &edition.authors {
        let record = source.author(&reference.key).await?;
        authors.push(Author::new(record.key, record.name));
    }
    Ok(authors)
}
