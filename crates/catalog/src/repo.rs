//! Repository for books, authors and their associations.
//!
//! Every statement is written against a `&mut SqliteConnection` so the same
//! helpers serve both one-off calls (on a pooled connection) and the
//! multi-statement [`reconcile`](Repository::reconcile) transaction.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{AssociationRow, AuthorRow, BookRow};
use exn::{OptionExt, ResultExt};
use shelf_openlibrary::models::{Author, Book};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::UtcDateTime;
use tracing::instrument;

/// A book as held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The book as it was ingested. `book.title` is never modified after
    /// ingestion; see [`override_title`](Self::override_title).
    pub book: Book,
    /// User correction of the title, if any.
    pub override_title: Option<String>,
    pub added_at: UtcDateTime,
}
impl Entry {
    /// Title for display: the override when one is set, the ingested title
    /// otherwise.
    pub fn title(&self) -> &str {
        self.override_title.as_deref().unwrap_or(&self.book.title)
    }
}

/// Outcome of [`Repository::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The book was new. `new_authors` counts authors that were not yet in
    /// the catalog; the rest were shared with books already present.
    Inserted { new_authors: usize },
    /// A book with the same identifier was already catalogued. Nothing was
    /// written.
    AlreadyPresent,
}

/// Row counts, mostly useful for reporting and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Counts {
    pub books: i64,
    pub authors: i64,
    pub associations: i64,
}

/// Repository for managing the book catalog.
///
/// # Relationships
///
/// - Books and authors are identified by their Open Library keys, both unique.
/// - Many books can share an author; the author row exists once.
/// - Each book lists its authors in order; a (book, author) pair exists once.
/// - Deleting a book cascades to its associations but never to authors.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
    staged: Arc<Mutex<Staged>>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone(), false)
    }
}

/// Identifiers a dry run has reported as inserted even though nothing was
/// committed.
#[derive(Debug, Default)]
struct Staged {
    books: HashSet<String>,
    authors: HashSet<String>,
}
impl Repository {
    /// Create a new repository with the given connection pool.
    ///
    /// In `dry_run` mode every write is performed inside a transaction that
    /// is rolled back. Books and authors reported as inserted are remembered
    /// for the lifetime of the repository (and its clones), so reconciling
    /// them again reports them as present, exactly as a real run would.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run, staged: Arc::default() }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn staged(&self) -> MutexGuard<'_, Staged> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn connection(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool.acquire().await.or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Reconcile
    // =========================================================================

    /// Make the catalog reflect a freshly looked-up book.
    ///
    /// 1. If a book with the same identifier exists, nothing is written (its
    ///    title, ISBNs and override are left as they are).
    /// 2. Otherwise each author is looked up by identifier and created if
    ///    absent. Existing authors keep their (possibly renamed) name.
    /// 3. The book is inserted and associated with its authors in order.
    ///
    /// All of it happens in one transaction: a failure at any step leaves no
    /// trace of the book, its new authors, or its associations. Inserts are
    /// `ON CONFLICT DO NOTHING` followed by a re-read, so a row created by
    /// someone else between the existence check and the insert is reused
    /// rather than duplicated.
    #[instrument(skip(self, book), fields(olid = %book.olid))]
    pub async fn reconcile(&self, book: &Book) -> Result<Reconciled> {
        book.validate().or_raise(|| ErrorKind::InvalidRecord)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        if find_book_row(&mut tx, &book.olid).await?.is_some()
            || (self.dry_run && self.staged().books.contains(&book.olid))
        {
            tracing::info!(title = %book.title, "Book already saved");
            return Ok(Reconciled::AlreadyPresent);
        }
        let Some(book_id) = insert_book_row(&mut tx, &BookRow::new(book, UtcDateTime::now())).await? else {
            tracing::info!(title = %book.title, "Book saved concurrently; skipping");
            return Ok(Reconciled::AlreadyPresent);
        };
        let mut new_authors = 0;
        let mut created_authors = Vec::new();
        for (position, author) in book.distinct_authors().enumerate() {
            let (author_id, created) = ensure_author(&mut tx, author).await?;
            if created && !(self.dry_run && self.staged().authors.contains(&author.olid)) {
                new_authors += 1;
                created_authors.push(author.olid.clone());
            }
            insert_association_row(&mut tx, book_id, author_id, position).await?;
        }
        self.finish(tx).await?;
        if self.dry_run {
            let mut staged = self.staged();
            staged.books.insert(book.olid.clone());
            staged.authors.extend(created_authors);
        }
        tracing::info!(title = %book.title, authors = book.authors.len(), new_authors, "Book saved");
        Ok(Reconciled::Inserted { new_authors })
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get a book (with its ordered authors) by identifier.
    pub async fn find_book(&self, olid: impl AsRef<str>) -> Result<Option<Entry>> {
        let mut conn = self.connection().await?;
        let Some(row) = find_book_row(&mut conn, olid.as_ref()).await? else {
            return Ok(None);
        };
        let authors = list_book_authors(&mut conn, row.id).await?;
        row.into_entry(authors).map(Some)
    }

    /// Get an author by identifier.
    pub async fn find_author(&self, olid: impl AsRef<str>) -> Result<Option<Author>> {
        let mut conn = self.connection().await?;
        Ok(find_author_row(&mut conn, olid.as_ref()).await?.map(Author::from))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every book in insertion order, each with its ordered authors and
    /// any title override.
    pub async fn list_books(&self) -> Result<Vec<Entry>> {
        let mut conn = self.connection().await?;
        let books: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books.sql"))
            .fetch_all(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let associations: Vec<AssociationRow> = sqlx::query_as(include_str!("../queries/list_associations.sql"))
            .fetch_all(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut authors: HashMap<i64, Vec<Author>> = HashMap::new();
        for row in associations {
            authors.entry(row.book_id).or_default().push(row.author.into());
        }
        books
            .into_iter()
            .map(|row| {
                let list = authors.remove(&row.id).unwrap_or_default();
                row.into_entry(list)
            })
            .collect()
    }

    pub async fn counts(&self) -> Result<Counts> {
        sqlx::query_as(include_str!("../queries/count.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a single book row without authors.
    ///
    /// Returns the new row id, or `None` if the identifier is already taken.
    /// Prefer [`reconcile`](Self::reconcile), which also handles authors.
    pub async fn insert_book(&self, book: &Book) -> Result<Option<i64>> {
        book.validate().or_raise(|| ErrorKind::InvalidRecord)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let id = insert_book_row(&mut tx, &BookRow::new(book, UtcDateTime::now())).await?;
        self.finish(tx).await?;
        Ok(id)
    }

    /// Insert an author, or return the id of the existing author with the
    /// same identifier (whose name is left untouched).
    pub async fn insert_author(&self, author: &Author) -> Result<i64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let (id, _created) = ensure_author(&mut tx, author).await?;
        self.finish(tx).await?;
        Ok(id)
    }

    /// Associate an existing book and author. Associating the same pair twice
    /// is a no-op.
    pub async fn insert_association(&self, book_id: i64, author_id: i64, position: usize) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        insert_association_row(&mut tx, book_id, author_id, position).await?;
        self.finish(tx).await
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Rename every author currently named exactly `old` to `new`.
    ///
    /// Authors are shared between books, so the new name shows up on every
    /// book they are associated with. Returns the number of author rows
    /// changed; zero is not an error.
    #[instrument(skip(self))]
    pub async fn rename_author(&self, old: &str, new: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/rename_author.sql"))
            .bind(new)
            .bind(old)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.finish(tx).await?;
        Ok(result.rows_affected())
    }

    /// Set the display title of a book without touching its ingested title.
    ///
    /// Returns the number of books changed (0 or 1).
    #[instrument(skip(self))]
    pub async fn override_title(&self, olid: &str, title: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/override_title.sql"))
            .bind(title)
            .bind(olid)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.finish(tx).await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a book and its author associations.
    ///
    /// Authors are kept, even when this was their last book. Returns the
    /// number of books deleted (0 or 1).
    #[instrument(skip(self))]
    pub async fn delete_book(&self, olid: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/delete_book.sql"))
            .bind(olid)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.finish(tx).await?;
        Ok(result.rows_affected())
    }

    async fn finish(&self, tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> Result<()> {
        match self.dry_run {
            true => tx.rollback().await.or_raise(|| ErrorKind::Database),
            false => tx.commit().await.or_raise(|| ErrorKind::Database),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

async fn find_book_row(conn: &mut SqliteConnection, olid: &str) -> Result<Option<BookRow>> {
    sqlx::query_as(include_str!("../queries/find_book.sql"))
        .bind(olid)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn find_author_row(conn: &mut SqliteConnection, olid: &str) -> Result<Option<AuthorRow>> {
    sqlx::query_as(include_str!("../queries/find_author.sql"))
        .bind(olid)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn list_book_authors(conn: &mut SqliteConnection, book_id: i64) -> Result<Vec<Author>> {
    let rows: Vec<AuthorRow> = sqlx::query_as(include_str!("../queries/list_book_authors.sql"))
        .bind(book_id)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(rows.into_iter().map(Author::from).collect())
}

/// `None` when a book with the same identifier already exists.
async fn insert_book_row(conn: &mut SqliteConnection, row: &BookRow) -> Result<Option<i64>> {
    sqlx::query_scalar(include_str!("../queries/insert_book.sql"))
        .bind(&row.olid)
        .bind(&row.isbn13)
        .bind(&row.isbn10)
        .bind(&row.title)
        .bind(row.added_at)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Returns the author's row id, and whether it had to be created.
async fn ensure_author(conn: &mut SqliteConnection, author: &Author) -> Result<(i64, bool)> {
    if let Some(existing) = find_author_row(&mut *conn, &author.olid).await? {
        return Ok((existing.id, false));
    }
    let inserted: Option<i64> = sqlx::query_scalar(include_str!("../queries/insert_author.sql"))
        .bind(&author.olid)
        .bind(&author.name)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if let Some(id) = inserted {
        tracing::debug!(olid = %author.olid, name = %author.name, "Created author");
        return Ok((id, true));
    }
    // Lost an insert race: the row exists now.
    let existing = find_author_row(conn, &author.olid).await?;
    existing.map(|row| (row.id, false)).ok_or_raise(|| ErrorKind::Database)
}

async fn insert_association_row(
    conn: &mut SqliteConnection,
    book_id: i64,
    author_id: i64,
    position: usize,
) -> Result<()> {
    let position = i64::try_from(position).or_raise(|| ErrorKind::InvalidData("author position"))?;
    sqlx::query(include_str!("../queries/insert_association.sql"))
        .bind(book_id)
        .bind(author_id)
        .bind(position)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}
