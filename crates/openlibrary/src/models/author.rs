use std::fmt::{Display, Formatter, Result as FmtResult};

/// An author as recorded by Open Library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Author {
    /// Service key, e.g. `/authors/OL34184A`
    pub olid: String,
    /// Display name
    pub name: String,
}
impl Author {
    pub fn new(olid: impl Into<String>, name: impl Into<String>) -> Self {
        Self { olid: olid.into(), name: name.into() }
    }
}
impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.name)
    }
}
