//! Candidate Pool Builder
//!
//! Assembles the request-scoped working set of books offered to the backend.
//! Three modes: the curated edition alone, the tag-filtered catalog, or the
//! default blend of both. Pools are rebuilt fresh per request, keep catalog
//! storage order, and never contain a duplicate id.

use std::collections::HashSet;

use tracing::debug;

use super::tags::{derive_tags, DerivedTags};
use crate::catalog::{BookRecord, Catalog, Edition};

/// Cap on the tag-filtered catalog slice.
pub const FILTER_LIMIT: usize = 120;

/// Prefix-slice size when the tag filter yields nothing in catalog mode.
const CATALOG_FALLBACK_SLICE: usize = 40;

/// Catalog share of the blend.
const BLEND_CATALOG_SLICE: usize = 60;

/// Which sources feed the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Curated edition only.
    Edition,
    /// Tag-filtered catalog, falling back to a prefix slice, then the
    /// edition.
    Catalog,
    /// Filtered catalog first for variety, then the edition appended.
    #[default]
    Blend,
}

impl SelectionMode {
    /// Parses the `CONCIERGE_MODE` setting; anything unrecognized blends.
    pub fn from_setting(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "edition" => SelectionMode::Edition,
            "catalog" => SelectionMode::Catalog,
            _ => SelectionMode::Blend,
        }
    }
}

/// Edition entries mapped into catalog shape. Edition books are not
/// tag-indexed, so genres and moods stay empty; the narrative field stands in
/// for a description.
fn edition_candidates(edition: &Edition) -> Vec<BookRecord> {
    edition
        .books
        .iter()
        .map(|book| BookRecord {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            genres: Vec::new(),
            moods: Vec::new(),
            subjects: Vec::new(),
            description: Some(book.why_this_book.clone()),
        })
        .collect()
}

fn dedup_by_id(pool: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    pool.into_iter().filter(|b| seen.insert(b.id.clone())).collect()
}

/// Builds the candidate pool for a message.
pub fn build_candidates(
    message: &str,
    mode: SelectionMode,
    catalog: &Catalog,
    edition: &Edition,
) -> Vec<BookRecord> {
    let tags: DerivedTags = derive_tags(message);
    let filtered = catalog.filter_by_tags(&tags.genres, &tags.moods, FILTER_LIMIT);
    debug!(
        "Pool build - mode={:?}, derived_moods={}, derived_genres={}, filtered={}",
        mode,
        tags.moods.len(),
        tags.genres.len(),
        filtered.len()
    );

    let pool = match mode {
        SelectionMode::Edition => edition_candidates(edition),
        SelectionMode::Catalog => {
            if !filtered.is_empty() {
                filtered
            } else if !catalog.is_empty() {
                catalog.prefix(CATALOG_FALLBACK_SLICE)
            } else {
                edition_candidates(edition)
            }
        }
        SelectionMode::Blend => {
            // Catalog entries lead for variety; always leading with the same
            // small edition set would repeat itself quickly.
            let catalog_books = if !filtered.is_empty() {
                filtered
            } else {
                catalog.prefix(BLEND_CATALOG_SLICE)
            };
            let mut blend = catalog_books;
            blend.extend(edition_candidates(edition));
            if blend.is_empty() {
                edition_candidates(edition)
            } else {
                blend
            }
        }
    };

    dedup_by_id(pool)
}

/// Removes explicitly excluded ids from a pool.
pub fn apply_exclusions(pool: &mut Vec<BookRecord>, exclude_ids: &[String]) {
    if exclude_ids.is_empty() {
        return;
    }
    let before = pool.len();
    pool.retain(|b| !exclude_ids.iter().any(|id| id == &b.id));
    debug!("Exclusions removed {} entries", before - pool.len());
}
