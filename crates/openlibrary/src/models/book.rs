use super::{Author, IsbnList};
use crate::error::{ErrorKind, Result};
use std::collections::HashSet;

/// A fully resolved edition: every author carries its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Service key, e.g. `/books/OL7353617M`
    pub olid: String,
    /// Title as returned by the lookup (possibly upgraded from the parent work)
    pub title: String,
    pub isbn_13: IsbnList,
    pub isbn_10: IsbnList,
    /// Authors in the order the service lists them
    pub authors: Vec<Author>,
}
impl Book {
    /// Checks the fields the catalog relies on for identity and display.
    pub fn validate(&self) -> Result<()> {
        if self.olid.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidRecord("book olid"));
        }
        if self.title.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidRecord("book title"));
        }
        for author in &self.authors {
            if author.olid.trim().is_empty() {
                exn::bail!(ErrorKind::InvalidRecord("author olid"));
            }
            if author.name.trim().is_empty() {
                exn::bail!(ErrorKind::InvalidRecord("author name"));
            }
        }
        Ok(())
    }

    /// Authors with repeated identifiers removed, keeping the first
    /// occurrence of each.
    pub fn distinct_authors(&self) -> impl Iterator<Item = &Author> {
        let mut seen = HashSet::new();
        self.authors.iter().filter(move |author| seen.insert(author.olid.as_str()))
    }

    /// Author names joined for display.
    pub fn byline(&self) -> String {
        self.authors.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn book() -> Book {
        Book {
            olid: "/books/OL1M".to_string(),
            title: "Book A".to_string(),
            isbn_13: IsbnList::default(),
            isbn_10: IsbnList::default(),
            authors: vec![Author::new("/authors/OL1A", "Author A"), Author::new("/authors/OL2A", "Author B")],
        }
    }

    #[test]
    fn test_valid() {
        assert!(book().validate().is_ok());
    }

    #[rstest]
    #[case(|b: &mut Book| b.olid = String::new(), "book olid")]
    #[case(|b: &mut Book| b.title = "   ".to_string(), "book title")]
    #[case(|b: &mut Book| b.authors[1].olid = String::new(), "author olid")]
    #[case(|b: &mut Book| b.authors[0].name = String::new(), "author name")]
    fn test_invalid(#[case] mutate: fn(&mut Book), #[case] field: &str) {
        let mut book = book();
        mutate(&mut book);
        let err = book.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord(f) if *f == field));
    }

    #[test]
    fn test_distinct_authors() {
        let mut book = book();
        book.authors.push(Author::new("/authors/OL1A", "Author A (again)"));
        let names = book.distinct_authors().map(|a| a.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Author A", "Author B"]);
    }

    #[test]
    fn test_byline() {
        assert_eq!(book().byline(), "Author A, Author B");
    }
}
