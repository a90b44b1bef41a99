mod author;
mod book;

pub(crate) use self::author::{AssociationRow, AuthorRow};
pub(crate) use self::book::BookRow;
