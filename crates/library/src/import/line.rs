use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::error::{ErrorKind, Result as ImportResult};
use derive_more::Display;
use exn::ResultExt;
use shelf_catalog::{Reconciled, Repository};
use shelf_openlibrary::models::{EditionId, Isbn};
use shelf_openlibrary::{Book, Source};
use tracing::instrument;

/// What each input line is expected to contain.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// An ISBN-13 or ISBN-10, possibly followed by junk (see [`Isbn`]).
    #[default]
    #[display("isbn")]
    Isbn,
    /// An edition identifier, bare or in key form (see [`EditionId`]).
    #[display("olid")]
    Olid,
}

/// The result of importing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The book was new to the catalog.
    Inserted { book: Book, new_authors: usize },
    /// The catalog already held a book with the same identifier; it was left
    /// untouched.
    AlreadyPresent { book: Book },
}
impl Outcome {
    pub fn book(&self) -> &Book {
        match self {
            Self::Inserted { book, .. } | Self::AlreadyPresent { book } => book,
        }
    }
}

/// Import a single identifier: validate it, look it up, reconcile the result
/// against the catalog.
///
/// Nothing is written unless the lookup fully succeeds, and the catalog write
/// itself is a single transaction, so a failed line leaves no trace.
pub async fn import_line(
    source: &dyn Source,
    repo: &Repository,
    format: Format,
    line: &str,
) -> LibraryResult<Outcome> {
    import_line_inner(source, repo, format, line).await.or_raise(|| LibraryErrorKind::Import)
}

#[instrument(skip(source, repo))]
pub(crate) async fn import_line_inner(
    source: &dyn Source,
    repo: &Repository,
    format: Format,
    line: &str,
) -> ImportResult<Outcome> {
    let lookup = match format {
        Format::Isbn => {
            let isbn: Isbn = line.parse::<Isbn>().or_raise(|| ErrorKind::Validation)?;
            shelf_openlibrary::lookup_by_isbn(source, &isbn).await
        },
        Format::Olid => {
            let id: EditionId = line.parse::<EditionId>().or_raise(|| ErrorKind::Validation)?;
            shelf_openlibrary::lookup_by_edition(source, &id).await
        },
    };
    let book = lookup.or_raise(|| ErrorKind::Lookup)?;
    let outcome = match repo.reconcile(&book).await.or_raise(|| ErrorKind::Catalog)? {
        Reconciled::Inserted { new_authors } => Outcome::Inserted { book, new_authors },
        Reconciled::AlreadyPresent => Outcome::AlreadyPresent { book },
    };
    Ok(outcome)
}
