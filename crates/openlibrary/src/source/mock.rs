//! In-memory record source for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{Isbn, Query};
use crate::source::{AuthorRecord, Edition, Reference, Source, Work, WorkAuthor};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory record source for testing.
///
/// Records are keyed by the request path they would be fetched from, so an
/// edition registered under an ISBN is only found by that ISBN. Every fetch is
/// recorded, which lets tests assert on exactly which requests a lookup made.
#[derive(Default)]
pub struct MockSource {
    editions: HashMap<String, Edition>,
    works: HashMap<String, Work>,
    authors: HashMap<String, AuthorRecord>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}
impl MockSource {
    /// Register an edition reachable by the given query.
    pub fn with_edition(mut self, query: &Query, edition: Edition) -> Self {
        self.editions.insert(query.path(), edition);
        self
    }

    /// Convenience wrapper around [`with_edition`](Self::with_edition) for the
    /// common ISBN-13 case.
    pub fn with_isbn_edition(self, isbn: &Isbn, key: &str, title: &str, authors: &[&str], works: &[&str]) -> Self {
        let edition = Edition {
            key: key.to_string(),
            title: title.to_string(),
            isbn_13: match isbn {
                Isbn::Isbn13(s) => vec![s.clone()],
                Isbn::Isbn10(_) => vec![],
            },
            isbn_10: match isbn {
                Isbn::Isbn10(s) => vec![s.clone()],
                Isbn::Isbn13(_) => vec![],
            },
            authors: authors.iter().copied().map(Reference::new).collect(),
            works: works.iter().copied().map(Reference::new).collect(),
        };
        self.with_edition(&Query::Isbn(isbn.clone()), edition)
    }

    pub fn with_work(mut self, key: &str, title: &str, subtitle: Option<&str>, authors: &[&str]) -> Self {
        let work = Work {
            title: title.to_string(),
            subtitle: subtitle.map(str::to_string),
            authors: authors.iter().map(|key| WorkAuthor { author: Reference::new(*key) }).collect(),
        };
        self.works.insert(format!("{key}.json"), work);
        self
    }

    pub fn with_author(mut self, key: &str, name: &str) -> Self {
        let author = AuthorRecord { key: key.to_string(), name: name.to_string() };
        self.authors.insert(format!("{key}.json"), author);
        self
    }

    /// Make requests for the given record key (e.g. `/authors/OL1A` or
    /// `/isbn/9780140449136`) fail with a server error.
    pub fn with_failure(mut self, key: &str) -> Self {
        self.failing.insert(format!("{key}.json"));
        self
    }

    /// Request paths in the order they were made.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn fetch<T: Clone>(&self, records: &HashMap<String, T>, path: String) -> Result<T> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.clone());
        }
        if self.failing.contains(&path) {
            exn::bail!(ErrorKind::Status(500, path));
        }
        records.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn edition(&self, query: &Query) -> Result<Edition> {
        self.fetch(&self.editions, query.path())
    }

    async fn work(&self, key: &str) -> Result<Work> {
        self.fetch(&self.works, format!("{key}.json"))
    }

    async fn author(&self, key: &str) -> Result<AuthorRecord> {
        self.fetch(&self.authors, format!("{key}.json"))
    }
}
