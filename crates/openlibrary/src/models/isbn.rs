use std::fmt::{Display, Formatter, Result as FmtResult};

/// Separator used when a list of candidates is flattened into one column.
/// ISBNs are digits, hyphens and the occasional `X`, so a comma never occurs.
pub const ISBN_SEPARATOR: char = ',';

/// The candidate ISBN codes of a single kind (13 or 10) for one edition.
///
/// Open Library frequently lists several codes per edition (misprints,
/// re-bindings sharing a record...). The catalog keeps all of them in a single
/// column; [`join`](Self::join) and [`split`](Self::split) are inverses of
/// each other for every list this type can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IsbnList(Vec<String>);
impl IsbnList {
    pub fn new(candidates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let candidates = candidates
            .into_iter()
            .map(Into::into)
            .filter(|candidate: &String| {
                let keep = !candidate.contains(ISBN_SEPARATOR);
                if !keep {
                    tracing::warn!(candidate, "Discarding ISBN candidate containing the list separator");
                }
                keep
            })
            .collect();
        Self(candidates)
    }

    /// Flatten for storage. An empty list has no serialized form.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_openlibrary::models::IsbnList;
    /// let list = IsbnList::new(["9780140449136", "9780140449137"]);
    /// assert_eq!(list.join().as_deref(), Some("9780140449136,9780140449137"));
    /// assert_eq!(IsbnList::default().join(), None);
    /// ```
    pub fn join(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.join(&ISBN_SEPARATOR.to_string()))
    }

    /// Inverse of [`join`](Self::join).
    pub fn split(serialized: Option<&str>) -> Self {
        match serialized {
            Some(s) => Self(s.split(ISBN_SEPARATOR).map(str::to_string).collect()),
            None => Self::default(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
impl<S: Into<String>> FromIterator<S> for IsbnList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
impl Display for IsbnList {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![])]
    #[case(vec!["9780140449136"])]
    #[case(vec!["9780140449136", "9780140449137", "9780140449138"])]
    #[case(vec!["0-14-044913-2", "014044913X"])]
    fn test_round_trip(#[case] candidates: Vec<&str>) {
        let list = IsbnList::new(candidates.clone());
        let restored = IsbnList::split(list.join().as_deref());
        assert_eq!(restored, list);
        assert_eq!(restored.iter().collect::<Vec<_>>(), candidates);
    }

    #[test]
    fn test_separator_is_discarded() {
        let list = IsbnList::new(["9780140449136", "978,0140449137"]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.join().as_deref(), Some("9780140449136"));
    }

    #[test]
    fn test_empty_is_not_serialized() {
        assert_eq!(IsbnList::new(Vec::<String>::new()).join(), None);
        assert!(IsbnList::split(None).is_empty());
    }
}
