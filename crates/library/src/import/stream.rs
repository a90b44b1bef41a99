use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::error::{Error as ImportError, ErrorKind as ImportErrorKind, Result as ImportResult};
use crate::import::line::{Format, Outcome, import_line_inner};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use shelf_catalog::Repository;
use shelf_openlibrary::Source;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Progress events emitted by [`import`] as it works through its input.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`Imported`](Self::Imported) or [`Failed`](Self::Failed): once per
///    input line, in input order.
/// 3. [`Complete`](Self::Complete): exactly once, with the totals.
///
/// A failed line does not end the stream. Only an unreadable input does, as
/// an `Err` item, in which case [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum ImportEvent {
    Started,
    /// Line `number` (1-based) was imported.
    Imported { number: usize, outcome: Outcome },
    /// Line `number` (1-based) could not be imported. `line` is the input
    /// exactly as read, minus its line terminator.
    Failed { number: usize, line: String, error: ImportError },
    Complete(Summary),
}

/// Totals for a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub inserted: usize,
    pub present: usize,
    pub failed: usize,
}
impl Summary {
    pub fn total(&self) -> usize {
        self.inserted + self.present + self.failed
    }

    fn record(&mut self, event: &ImportEvent) {
        match event {
            ImportEvent::Imported { outcome: Outcome::Inserted { .. }, .. } => self.inserted += 1,
            ImportEvent::Imported { outcome: Outcome::AlreadyPresent { .. }, .. } => self.present += 1,
            ImportEvent::Failed { .. } => self.failed += 1,
            ImportEvent::Started | ImportEvent::Complete(_) => {},
        }
    }
}

/// Streams [`ImportEvent`]s for every line of `input`, one identifier per
/// line.
///
/// Lines are processed strictly one after the other: each is looked up and
/// reconciled to completion before the next is read.
pub fn import<'a, R>(
    source: &'a dyn Source,
    repo: &'a Repository,
    format: Format,
    input: R,
) -> impl Stream<Item = LibraryResult<ImportEvent>> + 'a
where
    R: AsyncBufRead + Unpin + 'a,
{
    stream! {
        for await event in import_inner(source, repo, format, input) {
            yield event.or_raise(|| LibraryErrorKind::Import);
        }
    }
}

fn import_inner<'a, R>(
    source: &'a dyn Source,
    repo: &'a Repository,
    format: Format,
    input: R,
) -> impl Stream<Item = ImportResult<ImportEvent>> + 'a
where
    R: AsyncBufRead + Unpin + 'a,
{
    stream!({
        yield Ok(ImportEvent::Started);
        let mut summary = Summary::default();
        let mut lines = input.lines();
        let mut number = 0;
        loop {
            let line = match lines.next_line().await.or_raise(|| ImportErrorKind::Io) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            number += 1;
            let event = match import_line_inner(source, repo, format, &line).await {
                Ok(outcome) => ImportEvent::Imported { number, outcome },
                Err(error) => {
                    tracing::warn!(number, line = %line, error = ?error, "Could not import line");
                    ImportEvent::Failed { number, line, error }
                },
            };
            summary.record(&event);
            yield Ok(event);
        }
        tracing::info!(inserted = summary.inserted, present = summary.present, failed = summary.failed, "Import complete");
        yield Ok(ImportEvent::Complete(summary));
    })
}

/// Run a whole import, echoing every failed line verbatim (newline
/// terminated) to `exceptions` when given.
///
/// The exceptions output can be fed straight back in as the input of a later
/// run once whatever made those lines fail has been dealt with.
pub async fn run<R>(
    source: &dyn Source,
    repo: &Repository,
    format: Format,
    input: R,
    exceptions: Option<&mut (dyn AsyncWrite + Unpin)>,
) -> LibraryResult<Summary>
where
    R: AsyncBufRead + Unpin,
{
    run_inner(source, repo, format, input, exceptions).await.or_raise(|| LibraryErrorKind::Import)
}

async fn run_inner<R>(
    source: &dyn Source,
    repo: &Repository,
    format: Format,
    input: R,
    mut exceptions: Option<&mut (dyn AsyncWrite + Unpin)>,
) -> ImportResult<Summary>
where
    R: AsyncBufRead + Unpin,
{
    let mut events = std::pin::pin!(import_inner(source, repo, format, input));
    let mut summary = Summary::default();
    while let Some(event) = events.next().await {
        match event? {
            ImportEvent::Failed { line, .. } => {
                if let Some(out) = exceptions.as_deref_mut() {
                    out.write_all(line.as_bytes()).await.or_raise(|| ImportErrorKind::Io)?;
                    out.write_all(b"\n").await.or_raise(|| ImportErrorKind::Io)?;
                }
            },
            ImportEvent::Complete(totals) => summary = totals,
            ImportEvent::Started | ImportEvent::Imported { .. } => {},
        }
    }
    if let Some(out) = exceptions {
        out.flush().await.or_raise(|| ImportErrorKind::Io)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shelf_catalog::{Counts, Database};
    use shelf_openlibrary::models::Isbn;
    use shelf_openlibrary::source::MockSource;

    fn isbn(s: &str) -> Isbn {
        s.parse().unwrap()
    }

    fn source() -> MockSource {
        MockSource::default()
            .with_isbn_edition(
                &isbn("9780140449136"),
                "/books/OL1M",
                "The Odyssey",
                &["/authors/OL1A"],
                &["/works/OL1W"],
            )
            .with_work("/works/OL1W", "The Odyssey", Some("A New Translation"), &["/authors/OL1A", "/authors/OL2A"])
            .with_author("/authors/OL1A", "Homer")
            .with_author("/authors/OL2A", "Robert Fagles")
            .with_isbn_edition(&isbn("0140449132"), "/books/OL2M", "The Iliad", &["/authors/OL1A"], &[])
    }

    #[tokio::test]
    async fn test_import_end_to_end() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let source = source();
        let input = "9780140449136\nnot-an-isbn\n";
        let mut exceptions: Vec<u8> = Vec::new();
        let summary = run(&source, &repo, Format::Isbn, input.as_bytes(), Some(&mut exceptions)).await.unwrap();

        assert_eq!(summary, Summary { inserted: 1, present: 0, failed: 1 });
        assert_eq!(String::from_utf8(exceptions).unwrap(), "not-an-isbn\n");
        assert_eq!(repo.counts().await.unwrap(), Counts { books: 1, authors: 2, associations: 2 });
        let entry = repo.find_book("/books/OL1M").await.unwrap().unwrap();
        assert_eq!(entry.book.title, "The Odyssey: A New Translation");
        assert_eq!(entry.book.byline(), "Homer, Robert Fagles");
        // The invalid line never reached the lookup service.
        assert!(!source.requests().iter().any(|path| path.contains("not-an-isbn")));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let repo = Repository::from(&Database::connect_in_memory().await.unwrap());
        let source = source();
        // Unknown ISBN, a duplicate, garbage, then a good line.
        let input = "9780000000000\n9780140449136\n9780140449136\n???\n0140449132";
        let mut exceptions: Vec<u8> = Vec::new();
        let summary = run(&source, &repo, Format::Isbn, input.as_bytes(), Some(&mut exceptions)).await.unwrap();

        assert_eq!(summary, Summary { inserted: 2, present: 1, failed: 2 });
        assert_eq!(summary.total(), 5);
        assert_eq!(String::from_utf8(exceptions).unwrap(), "9780000000000\n???\n");
        // The shared author exists once.
        assert_eq!(repo.counts().await.unwrap(), Counts { books: 2, authors: 2, associations: 3 });
    }

    #[tokio::test]
    async fn test_without_exceptions_output() {
        let repo = Repository::from(&Database::connect_in_memory().await.unwrap());
        let summary = run(&source(), &repo, Format::Isbn, "bad\n".as_bytes(), None).await.unwrap();
        assert_eq!(summary, Summary { inserted: 0, present: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_event_order() {
        let repo = Repository::from(&Database::connect_in_memory().await.unwrap());
        let source = source();
        let events: Vec<_> = import(&source, &repo, Format::Isbn, "bad\r\n0140449132\r\n".as_bytes())
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], ImportEvent::Started));
        assert!(
            matches!(&events[1], ImportEvent::Failed { number: 1, line, error } if line == "bad" && **error == ImportErrorKind::Validation)
        );
        assert!(matches!(&events[2], ImportEvent::Imported { number: 2, outcome: Outcome::Inserted { .. } }));
        assert!(matches!(events[3], ImportEvent::Complete(Summary { inserted: 1, present: 0, failed: 1 })));
    }

    #[rstest]
    #[case("9780140449136\n9780140449136\n", Summary { inserted: 1, present: 1, failed: 0 })]
    #[case("9780140449136\n0140449132\n9780140449136\nbad\n", Summary { inserted: 2, present: 1, failed: 1 })]
    #[tokio::test]
    async fn test_dry_run_summary_matches_real_run(#[case] input: &str, #[case] expected: Summary) {
        let db = Database::connect_in_memory().await.unwrap();
        let dry = Repository::new(db.pool().clone(), true);
        let summary = run(&source(), &dry, Format::Isbn, input.as_bytes(), None).await.unwrap();
        assert_eq!(summary, expected);
        assert_eq!(dry.counts().await.unwrap(), Counts::default());

        let real = Repository::from(&Database::connect_in_memory().await.unwrap());
        let summary = run(&source(), &real, Format::Isbn, input.as_bytes(), None).await.unwrap();
        assert_eq!(summary, expected);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let repo = Repository::from(&Database::connect_in_memory().await.unwrap());
        let summary = run(&source(), &repo, Format::Olid, "".as_bytes(), None).await.unwrap();
        assert_eq!(summary, Summary::default());
    }
}
