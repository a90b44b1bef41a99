//! CSV export of the catalog.
//!
//! ```text
//! title,author,url
//! "The Odyssey: A New Translation","Homer, Robert Fagles","https://openlibrary.org/books/OL1M"
//! ```
//!
//! Every field is double-quoted; a quote inside a field is doubled. Titles
//! are the display title, so a title override wins over the ingested title.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{Entry, Repository};
use shelf_openlibrary::ORIGIN;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument;

pub const HEADER: &str = "title,author,url";

/// Write every catalogued book to `out`, in insertion order.
///
/// Returns the number of rows written, not counting the header.
#[instrument(skip_all)]
pub async fn export<W>(repo: &Repository, out: &mut W) -> Result<usize>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let entries = repo.list_books().await.or_raise(|| ErrorKind::Export)?;
    out.write_all(HEADER.as_bytes()).await.or_raise(|| ErrorKind::Export)?;
    out.write_all(b"\n").await.or_raise(|| ErrorKind::Export)?;
    for entry in &entries {
        out.write_all(row(entry).as_bytes()).await.or_raise(|| ErrorKind::Export)?;
        out.write_all(b"\n").await.or_raise(|| ErrorKind::Export)?;
    }
    out.flush().await.or_raise(|| ErrorKind::Export)?;
    tracing::info!(rows = entries.len(), "Export complete");
    Ok(entries.len())
}

/// A single CSV row (without line terminator).
pub fn row(entry: &Entry) -> String {
    let byline = entry.book.byline();
    let url = format!("{ORIGIN}{}", entry.book.olid);
    [entry.title(), byline.as_str(), url.as_str()].map(quote).join(",")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
