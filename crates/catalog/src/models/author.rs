use shelf_openlibrary::Author;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuthorRow {
    pub(crate) id: i64,
    pub(crate) olid: String,
    pub(crate) name: String,
}
impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author::new(row.olid, row.name)
    }
}

/// An author as listed against one book.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AssociationRow {
    pub(crate) book_id: i64,
    #[sqlx(flatten)]
    pub(crate) author: AuthorRow,
}
