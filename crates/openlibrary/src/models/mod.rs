mod author;
mod book;
mod identifier;
mod isbn;

pub use self::author::Author;
pub use self::book::Book;
pub use self::identifier::{EditionId, Isbn, Query};
pub use self::isbn::{ISBN_SEPARATOR, IsbnList};
