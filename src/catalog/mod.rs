//! Book Catalog
//!
//! The read-only corpus of catalog entries. Loaded once at startup and shared
//! immutably for the process lifetime; per-request candidate pools are built
//! from it without ever mutating it.

pub mod edition;

pub use edition::{
    AiEdition, Edition, EditionBook, EditionCurator, EditorialNote, MAX_EDITION_BOOKS,
};

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single catalog entry. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The in-memory catalog. Storage order is preserved: tag filtering returns
/// entries in the order they were loaded, with no relevance ranking beyond
/// the any-match boolean.
pub struct Catalog {
    books: Vec<BookRecord>,
}

impl Catalog {
    /// Builds a catalog, dropping entries whose id repeats an earlier one.
    pub fn new(books: Vec<BookRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let books = books
            .into_iter()
            .filter(|b| seen.insert(b.id.clone()))
            .collect();
        Self { books }
    }

    pub fn empty() -> Self {
        Self { books: Vec::new() }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let books: Vec<BookRecord> =
            serde_json::from_str(raw).context("catalog JSON is malformed")?;
        Ok(Self::new(books))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog at {}", path.display()))?;
        let catalog = Self::from_json(&raw)?;
        info!("Catalog loaded - entries={}, path={}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Any-match tag filter: an entry qualifies when it shares at least one
    /// mood OR at least one genre with the derived tags. Matching is exact
    /// set membership over the stored tag strings; duplicates in the derived
    /// lists are harmless (bag semantics).
    pub fn filter_by_tags(&self, genres: &[String], moods: &[String], limit: usize) -> Vec<BookRecord> {
        if self.books.is_empty() || (genres.is_empty() && moods.is_empty()) {
            return Vec::new();
        }
        self.books
            .iter()
            .filter(|book| {
                genres.iter().any(|g| book.genres.iter().any(|bg| bg == g))
                    || moods.iter().any(|m| book.moods.iter().any(|bm| bm == m))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// An arbitrary prefix slice of the raw catalog, used when the tag filter
    /// comes back empty.
    pub fn prefix(&self, limit: usize) -> Vec<BookRecord> {
        self.books.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, moods: &[&str], genres: &[&str]) -> BookRecord {
        BookRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            author: "Author".to_string(),
            genres: genres.iter().map(|s| s.to_string()).collect(),
            moods: moods.iter().map(|s| s.to_string()).collect(),
            subjects: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn deduplicates_on_load() {
        let catalog = Catalog::new(vec![book("a", &[], &[]), book("a", &[], &[]), book("b", &[], &[])]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn any_match_across_moods_and_genres() {
        let catalog = Catalog::new(vec![
            book("m", &["hopeful"], &[]),
            book("g", &[], &["poetry"]),
            book("n", &["bleak"], &["noir"]),
        ]);
        let hits = catalog.filter_by_tags(
            &["poetry".to_string()],
            &["hopeful".to_string()],
            120,
        );
        let ids: Vec<_> = hits.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "g"]);
    }

    #[test]
    fn empty_tags_yield_no_matches() {
        let catalog = Catalog::new(vec![book("a", &["hopeful"], &[])]);
        assert!(catalog.filter_by_tags(&[], &[], 120).is_empty());
    }

    #[test]
    fn filter_respects_limit_and_order() {
        let books: Vec<_> = (0..10).map(|i| book(&format!("b{i}"), &["quiet"], &[])).collect();
        let catalog = Catalog::new(books);
        let hits = catalog.filter_by_tags(&[], &["quiet".to_string()], 3);
        let ids: Vec<_> = hits.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b0", "b1", "b2"]);
    }
}
