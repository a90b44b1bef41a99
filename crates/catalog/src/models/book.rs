use crate::Entry;
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use shelf_openlibrary::models::{Author, Book, IsbnList};
use time::UtcDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) olid: String,
    pub(crate) isbn13: Option<String>,
    pub(crate) isbn10: Option<String>,
    pub(crate) title: String,
    pub(crate) override_title: Option<String>,
    pub(crate) added_at: i64,
}
impl BookRow {
    /// Row for a book about to be inserted (the id is assigned by SQLite).
    pub(crate) fn new(book: &Book, added_at: UtcDateTime) -> Self {
        Self {
            id: 0,
            olid: book.olid.clone(),
            isbn13: book.isbn_13.join(),
            isbn10: book.isbn_10.join(),
            title: book.title.clone(),
            override_title: None,
            added_at: added_at.unix_timestamp(),
        }
    }

    pub(crate) fn into_entry(self, authors: Vec<Author>) -> Result<Entry, Error> {
        Ok(Entry {
            book: Book {
                olid: self.olid,
                title: self.title,
                isbn_13: IsbnList::split(self.isbn13.as_deref()),
                isbn_10: IsbnList::split(self.isbn10.as_deref()),
                authors,
            },
            override_title: self.override_title,
            added_at: UtcDateTime::from_unix_timestamp(self.added_at).or_raise(|| ErrorKind::InvalidData("added at"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book {
            olid: "/books/OL1M".to_string(),
            title: "Book A".to_string(),
            isbn_13: IsbnList::new(["9780140449136", "9780140449137"]),
            isbn_10: IsbnList::default(),
            authors: vec![Author::new("/authors/OL1A", "Author A")],
        }
    }

    #[test]
    fn test_model_to_row() {
        let row = BookRow::new(&book(), UtcDateTime::now());
        assert_eq!(row.isbn13.as_deref(), Some("9780140449136,9780140449137"));
        assert_eq!(row.isbn10, None);
        assert_eq!(row.override_title, None);
    }

    #[test]
    fn test_row_to_model() {
        let added = UtcDateTime::now();
        let book = book();
        let row = BookRow::new(&book, added);
        let entry = row.into_entry(book.authors.clone()).unwrap();
        assert_eq!(entry.book, book);
        // Converting to a Unix timestamp (measured in seconds) inherently strips the nanoseconds component.
        assert_eq!(entry.added_at, added.replace_nanosecond(0).unwrap());
    }
}
