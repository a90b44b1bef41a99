//! Edition/work arbitration.
//!
//! Edition records are typed in per physical printing and are frequently
//! truncated ("The Odyssey" instead of "The Odyssey: A New Translation") or
//! carry an incomplete author list. The parent work is curated more
//! carefully, so when an edition belongs to exactly one work the work's data
//! is preferred:
//!
//! - **Title**: the work's title (plus `": subtitle"` when it has one) wins
//!   only when it is strictly longer, counted in characters.
//! - **Authors**: a non-empty work author list replaces the edition's outright.
//!
//! Editions referencing zero or several works are left alone; there is no
//! way to tell which work is the right one.

use crate::error::Result;
use crate::source::{Edition, Reference, Source, Work};
use tracing::instrument;

/// The title a work would contribute.
///
/// # Examples
///
/// ```
/// use shelf_openlibrary::source::Work;
/// use shelf_openlibrary::work::candidate_title;
/// let work = Work { title: "Dune".into(), subtitle: Some("Deluxe Edition".into()), authors: vec![] };
/// assert_eq!(candidate_title(&work), "Dune: Deluxe Edition");
/// ```
pub fn candidate_title(work: &Work) -> String {
    match work.subtitle.as_deref() {
        Some(subtitle) if !subtitle.is_empty() => format!("{}: {}", work.title, subtitle),
        _ => work.title.clone(),
    }
}

/// Merge a work's title and authors into its edition.
pub fn arbitrate(edition: &mut Edition, work: Work) {
    let candidate = candidate_title(&work);
    if candidate.chars().count() > edition.title.chars().count() {
        tracing::debug!(from = %edition.title, to = %candidate, "Preferring work title");
        edition.title = candidate;
    }
    if !work.authors.is_empty() {
        edition.authors = work.authors.into_iter().map(|a| a.author).collect();
    }
}

/// The single work an edition belongs to, if it is unambiguous.
pub fn sole_work(edition: &Edition) -> Option<&Reference> {
    match edition.works.as_slice() {
        [work] => Some(work),
        _ => None,
    }
}

/// Fetch the edition's parent work (when unambiguous) and arbitrate.
///
/// Returns whether a work was consulted.
#[instrument(skip_all, fields(edition = %edition.key))]
pub async fn resolve(source: &dyn Source, edition: &mut Edition) -> Result<bool> {
    let Some(key) = sole_work(edition).map(|work| work.key.clone()) else {
        tracing::debug!(works = edition.works.len(), "No unambiguous work; keeping edition data");
        return Ok(false);
    };
    let work = source.work(&key).await?;
    arbitrate(edition, work);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockSource, WorkAuthor};
    use rstest::rstest;

    fn edition(title: &str, authors: &[&str], works: &[&str]) -> Edition {
        Edition {
            key: "/books/OL1M".to_string(),
            title: title.to_string(),
            isbn_13: vec![],
            isbn_10: vec![],
            authors: authors.iter().copied().map(Reference::new).collect(),
            works: works.iter().copied().map(Reference::new).collect(),
        }
    }

    fn work(title: &str, subtitle: Option<&str>, authors: &[&str]) -> Work {
        Work {
            title: title.to_string(),
            subtitle: subtitle.map(str::to_string),
            authors: authors.iter().map(|key| WorkAuthor { author: Reference::new(*key) }).collect(),
        }
    }

    #[rstest]
    #[case("Foo", "Foobar", None, "Foobar")]
    #[case("A Very Long Title", "Short", None, "A Very Long Title")]
    // Equal length is not an improvement.
    #[case("Abcdef", "Ghijkl", None, "Abcdef")]
    #[case("Dune", "Dune", Some("Deluxe Edition"), "Dune: Deluxe Edition")]
    #[case("Dune", "Dune", Some(""), "Dune")]
    // Counted in characters, not bytes: "Cafés" is 5 characters but 6 bytes.
    #[case("Cafes", "Cafés", None, "Cafes")]
    #[case("Caf", "Café", None, "Café")]
    fn test_title_arbitration(
        #[case] edition_title: &str,
        #[case] work_title: &str,
        #[case] subtitle: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut edition = edition(edition_title, &[], &["/works/OL1W"]);
        arbitrate(&mut edition, work(work_title, subtitle, &[]));
        assert_eq!(edition.title, expected);
    }

    #[test]
    fn test_work_authors_replace_edition_authors() {
        let mut edition = edition("Title", &["/authors/OL1A", "/authors/OL2A"], &["/works/OL1W"]);
        arbitrate(&mut edition, work("T", None, &["/authors/OL3A"]));
        assert_eq!(edition.authors, vec![Reference::new("/authors/OL3A")]);
    }

    #[test]
    fn test_empty_work_authors_keep_edition_authors() {
        let mut edition = edition("Title", &["/authors/OL1A"], &["/works/OL1W"]);
        arbitrate(&mut edition, work("T", None, &[]));
        assert_eq!(edition.authors, vec![Reference::new("/authors/OL1A")]);
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&["/works/OL1W"], Some("/works/OL1W"))]
    #[case(&["/works/OL1W", "/works/OL2W"], None)]
    fn test_sole_work(#[case] works: &[&str], #[case] expected: Option<&str>) {
        let edition = edition("Title", &[], works);
        assert_eq!(sole_work(&edition).map(|r| r.key.as_str()), expected);
    }

    #[tokio::test]
    async fn test_resolve_skips_ambiguous_works() {
        let source = MockSource::default();
        let mut edition = edition("Foo", &["/authors/OL1A"], &["/works/OL1W", "/works/OL2W"]);
        let consulted = resolve(&source, &mut edition).await.unwrap();
        assert!(!consulted);
        assert!(source.requests().is_empty());
        assert_eq!(edition.title, "Foo");
    }

    #[tokio::test]
    async fn test_resolve_fetches_sole_work() {
        let source = MockSource::default().with_work("/works/OL1W", "Foobar", None, &["/authors/OL9A"]);
        let mut edition = edition("Foo", &["/authors/OL1A"], &["/works/OL1W"]);
        let consulted = resolve(&source, &mut edition).await.unwrap();
        assert!(consulted);
        assert_eq!(source.requests(), vec!["/works/OL1W.json"]);
        assert_eq!(edition.title, "Foobar");
        assert_eq!(edition.authors, vec![Reference::new("/authors/OL9A")]);
    }

    #[tokio::test]
    async fn test_resolve_propagates_work_failure() {
        let source = MockSource::default().with_failure("/works/OL1W");
        let mut edition = edition("Foo", &[], &["/works/OL1W"]);
        assert!(resolve(&source, &mut edition).await.is_err());
    }
}
