//! Identifiers accepted as import input.
//!
//! Input lines are usually scanned barcodes or copy-pasted from spreadsheets,
//! so they are matched by prefix: trailing junk after a recognisable ISBN is
//! ignored rather than rejected.

use crate::error::{Error, ErrorKind};
use regex::Regex;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

static ISBN13_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(97[0-9]{11})").unwrap());
static ISBN10_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]{10})").unwrap());
static EDITION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:/books/)?(OL[0-9]+M)$").unwrap());

/// A sanitized ISBN, ready to be sent to the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Isbn {
    Isbn13(String),
    Isbn10(String),
}
impl Isbn {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Isbn13(s) | Self::Isbn10(s) => s,
        }
    }
}

/// ISBN-13 is tried first: every ISBN-13 also starts with ten digits.
///
/// # Examples
///
/// ```
/// use shelf_openlibrary::models::Isbn;
/// let isbn: Isbn = "9780140449136 (paperback)".parse().unwrap();
/// assert_eq!(isbn, Isbn::Isbn13("9780140449136".to_string()));
/// assert!("not-an-isbn".parse::<Isbn>().is_err());
/// ```
impl FromStr for Isbn {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(captures) = ISBN13_REGEX.captures(s) {
            return Ok(Self::Isbn13(captures[1].to_string()));
        }
        if let Some(captures) = ISBN10_REGEX.captures(s) {
            return Ok(Self::Isbn10(captures[1].to_string()));
        }
        exn::bail!(ErrorKind::InvalidIsbn(s.to_string()))
    }
}
impl Display for Isbn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An Open Library edition identifier (`OL7353617M`).
///
/// Accepts both the bare identifier and the `/books/` key form that the
/// service uses in its JSON payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditionId(String);
impl EditionId {
    /// The bare identifier, e.g. `OL7353617M`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The service key, e.g. `/books/OL7353617M`. Books are stored in the
    /// catalog under this form.
    pub fn key(&self) -> String {
        format!("/books/{}", self.0)
    }
}
impl FromStr for EditionId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match EDITION_REGEX.captures(trimmed) {
            Some(captures) => Ok(Self(captures[1].to_string())),
            None => exn::bail!(ErrorKind::InvalidOlid(s.to_string())),
        }
    }
}
impl Display for EditionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// What to ask the lookup service for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Isbn(Isbn),
    Edition(EditionId),
}
impl Query {
    /// Path (relative to the service origin) of the edition record.
    pub fn path(&self) -> String {
        match self {
            Self::Isbn(isbn) => format!("/isbn/{isbn}.json"),
            Self::Edition(id) => format!("{}.json", id.key()),
        }
    }
}
impl From<Isbn> for Query {
    fn from(isbn: Isbn) -> Self {
        Self::Isbn(isbn)
    }
}
impl From<EditionId> for Query {
    fn from(id: EditionId) -> Self {
        Self::Edition(id)
    }
}
impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Isbn(isbn) => write!(f, "isbn {isbn}"),
            Self::Edition(id) => write!(f, "edition {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("9780140449136", Isbn::Isbn13("9780140449136".to_string()))]
    #[case("9780140449136 ", Isbn::Isbn13("9780140449136".to_string()))]
    #[case("978014044913612345", Isbn::Isbn13("9780140449136".to_string()))]
    #[case("0140449132", Isbn::Isbn10("0140449132".to_string()))]
    #[case("0140449132-hardback", Isbn::Isbn10("0140449132".to_string()))]
    // Not a 97x prefix, so only the leading ten digits are taken.
    #[case("1234567890123", Isbn::Isbn10("1234567890".to_string()))]
    fn test_isbn_sanitize(#[case] input: &str, #[case] expected: Isbn) {
        assert_eq!(input.parse::<Isbn>().unwrap(), expected);
    }

    #[rstest]
    #[case("not-an-isbn")]
    #[case("")]
    #[case(" 9780140449136")]
    #[case("014044913X")]
    #[case("978-0-14-044913-6")]
    #[case("97٠١٤٠٤٤٩١٣٦")]
    #[case("٠١٤٠٤٤٩١٣٢")]
    #[case("９７８０１４０４４９１３６")]
    fn test_isbn_invalid(#[case] input: &str) {
        let err = input.parse::<Isbn>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidIsbn(s) if s == input));
        assert!(err.is_validation());
    }

    #[rstest]
    #[case("OL7353617M", "OL7353617M")]
    #[case("/books/OL7353617M", "OL7353617M")]
    #[case("  OL1M\n", "OL1M")]
    fn test_edition_id(#[case] input: &str, #[case] expected: &str) {
        let id = input.parse::<EditionId>().unwrap();
        assert_eq!(id.as_str(), expected);
        assert_eq!(id.key(), format!("/books/{expected}"));
    }

    #[rstest]
    #[case("OL7353617W")]
    #[case("/authors/OL1A")]
    #[case("ol7353617m")]
    #[case("9780140449136")]
    #[case("OL٧٣٥٣٦١٧M")]
    #[case("/books/OL７M")]
    fn test_edition_id_invalid(#[case] input: &str) {
        let err = input.parse::<EditionId>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidOlid(_)));
    }

    #[test]
    fn test_query_path() {
        let isbn = Query::from("9780140449136".parse::<Isbn>().unwrap());
        assert_eq!(isbn.path(), "/isbn/9780140449136.json");
        let edition = Query::from("OL7353617M".parse::<EditionId>().unwrap());
        assert_eq!(edition.path(), "/books/OL7353617M.json");
    }
}
