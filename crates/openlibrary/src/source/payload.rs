//! Wire shapes of the Open Library JSON endpoints.
//!
//! Only the fields the catalog consumes are declared; everything else in the
//! (rather large) payloads is ignored. Missing lists default to empty.

use serde::Deserialize;

/// A `{"key": "..."}` reference to another record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    pub key: String,
}
impl Reference {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// `GET /isbn/{isbn}.json` or `GET /books/{olid}.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Edition {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub isbn_13: Vec<String>,
    #[serde(default)]
    pub isbn_10: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Reference>,
    #[serde(default)]
    pub works: Vec<Reference>,
}

/// Works wrap each author reference in a role object:
/// `{"author": {"key": "/authors/OL1A"}, "type": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkAuthor {
    pub author: Reference,
}

/// `GET /works/{olid}.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Work {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<WorkAuthor>,
}

/// `GET /authors/{olid}.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorRecord {
    pub key: String,
    #[serde(default)]
    pub name: String,
}
