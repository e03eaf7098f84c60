//! Representation Balancing
//!
//! Classifies authors against a designated origin category and shapes the
//! candidate pool toward a representation target. Pool shaping here is a
//! soft constraint; the reconciler enforces the hard guarantee on the final
//! short list.

use regex::Regex;

use crate::catalog::{BookRecord, Catalog};

/// How strongly target-origin authors should figure in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginRequirement {
    /// Default: aim for a balanced share (half) of target-origin authors.
    Balanced,
    /// Explicit request: target-origin authors only.
    Required,
    /// Explicit opt-out: no target-origin quota, and none enforced in the
    /// final list.
    Excluded,
}

/// Pluggable origin classifier. The balancing algorithm never looks at the
/// name list directly, so the list can be swapped or extended freely.
pub trait OriginClassifier: Send + Sync {
    fn is_target_origin(&self, author: &str) -> bool;

    /// Title-level markers (places, settings) that count an entry toward the
    /// target partition even when the author is not on the list.
    fn title_suggests_target(&self, _title: &str) -> bool {
        false
    }
}

/// Known Indian authors, matched on word boundaries so short names cannot
/// fire inside unrelated longer ones.
const INDIAN_AUTHORS: &[&str] = &[
    // Classic
    "r.k. narayan",
    "r k narayan",
    "ruskin bond",
    "amitav ghosh",
    "arundhati roy",
    "jhumpa lahiri",
    "vikram seth",
    "anita desai",
    "salman rushdie",
    "rohinton mistry",
    "kiran desai",
    "aravind adiga",
    "shashi tharoor",
    "premchand",
    "tagore",
    "rabindranath tagore",
    "mulk raj anand",
    "r.k. laxman",
    // Contemporary
    "chetan bhagat",
    "amish tripathi",
    "devdutt pattanaik",
    "sudha murty",
    "manu s pillai",
    "shobhaa de",
    "anuja chauhan",
    "anuradha roy",
    "manju kapur",
    "bharati mukherjee",
    // Regional
    "vaikom muhammad basheer",
    "kamala das",
    "o.v. vijayan",
    "mahasweta devi",
    "nirmal verma",
    "u.r. ananthamurthy",
    "girish karnad",
    "shyam selvadurai",
    "nayantara sahgal",
    // Ancient / classical (both romanizations)
    "valmiki",
    "vālmīki",
    "vatsyayana",
    "vātsyāyana",
    "kalidasa",
    "kālidāsa",
    // Historians / non-fiction
    "jawaharlal nehru",
    "ramachandra guha",
    "amartya sen",
    "khushwant singh",
    // Women authors
    "shashi deshpande",
    "bama",
    "nabaneeta dev sen",
    "ambai",
    "ismat chughtai",
    "abul kalam azad",
];

const TITLE_MARKERS: &[&str] = &[
    "india", "delhi", "mumbai", "bengal", "malgudi", "calcutta", "kolkata",
    "chennai",
];

/// Name-list classifier for Indian authors.
pub struct IndianAuthors {
    patterns: Vec<Regex>,
}

impl IndianAuthors {
    pub fn new() -> Self {
        let patterns = INDIAN_AUTHORS
            .iter()
            .filter_map(|name| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).ok()
            })
            .collect();
        Self { patterns }
    }
}

impl Default for IndianAuthors {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginClassifier for IndianAuthors {
    fn is_target_origin(&self, author: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(author))
    }

    fn title_suggests_target(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        TITLE_MARKERS.iter().any(|m| lower.contains(m))
    }
}

/// Default share of the final list drawn from the target partition.
pub const BALANCED_FRACTION: f32 = 0.5;

/// Minimum target-partition depth in the shaped pool, expanded from the full
/// catalog when the tag-filtered matches run thin.
const MIN_TARGET_POOL: usize = 20;

/// Floor on the shaped pool's working size.
const MIN_POOL_TOTAL: usize = 40;

fn entry_matches(book: &BookRecord, classifier: &dyn OriginClassifier) -> bool {
    classifier.is_target_origin(&book.author) || classifier.title_suggests_target(&book.title)
}

/// Re-shapes a candidate pool toward the representation target.
///
/// `eligible` guards catalog expansion: entries already removed from the pool
/// by the exclusion list or the audience filter must not sneak back in.
pub fn balance_pool(
    pool: Vec<BookRecord>,
    requirement: OriginRequirement,
    catalog: &Catalog,
    classifier: &dyn OriginClassifier,
    eligible: &dyn Fn(&BookRecord) -> bool,
) -> Vec<BookRecord> {
    match requirement {
        // No shaping: the reconciler strips target-origin entries from the
        // final list instead.
        OriginRequirement::Excluded => pool,
        OriginRequirement::Required => pool
            .into_iter()
            .filter(|b| entry_matches(b, classifier))
            .collect(),
        OriginRequirement::Balanced => {
            let (mut matching, other): (Vec<BookRecord>, Vec<BookRecord>) = pool
                .iter()
                .cloned()
                .partition(|b| entry_matches(b, classifier));

            if matching.len() < MIN_TARGET_POOL {
                let have: Vec<String> = matching.iter().map(|b| b.id.clone()).collect();
                let extra: Vec<BookRecord> = catalog
                    .books()
                    .iter()
                    .filter(|b| {
                        classifier.is_target_origin(&b.author)
                            && !have.contains(&b.id)
                            && eligible(b)
                    })
                    .cloned()
                    .collect();
                matching.extend(extra);
                matching.truncate(MIN_TARGET_POOL.max(have.len()));
            }

            let total = pool.len().max(MIN_POOL_TOTAL);
            let half = total / 2;

            let mut shaped: Vec<BookRecord> = Vec::with_capacity(total);
            shaped.extend(matching.into_iter().take(half));
            shaped.extend(other.into_iter().take(half));
            shaped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, author: &str) -> BookRecord {
        BookRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            author: author.to_string(),
            genres: Vec::new(),
            moods: Vec::new(),
            subjects: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn word_boundary_prevents_false_positives() {
        let classifier = IndianAuthors::new();
        assert!(classifier.is_target_origin("Bama"));
        assert!(classifier.is_target_origin("Ismat Chughtai"));
        // "bama" must not fire inside "Obama".
        assert!(!classifier.is_target_origin("Barack Obama"));
    }

    #[test]
    fn title_markers_count_toward_target() {
        let classifier = IndianAuthors::new();
        assert!(classifier.title_suggests_target("Malgudi Days"));
        assert!(!classifier.title_suggests_target("A Quiet Evening"));
    }

    #[test]
    fn required_keeps_only_matching() {
        let classifier = IndianAuthors::new();
        let catalog = Catalog::new(Vec::new());
        let pool = vec![
            book("a", "Ruskin Bond"),
            book("b", "Jane Austen"),
            book("c", "Sudha Murty"),
        ];
        let shaped = balance_pool(
            pool,
            OriginRequirement::Required,
            &catalog,
            &classifier,
            &|_| true,
        );
        let ids: Vec<_> = shaped.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn balanced_takes_matching_first() {
        let classifier = IndianAuthors::new();
        let catalog = Catalog::new(Vec::new());
        let pool = vec![
            book("i1", "Ruskin Bond"),
            book("o1", "Jane Austen"),
            book("i2", "Anita Desai"),
            book("o2", "George Eliot"),
        ];
        let shaped = balance_pool(
            pool,
            OriginRequirement::Balanced,
            &catalog,
            &classifier,
            &|_| true,
        );
        // Matching partition leads, then the others.
        assert_eq!(shaped[0].id, "i1");
        assert_eq!(shaped[1].id, "i2");
        assert!(shaped.iter().any(|b| b.id == "o1"));
    }

    #[test]
    fn balanced_expands_matching_from_catalog() {
        let classifier = IndianAuthors::new();
        let mut catalog_books = vec![book("extra1", "Kamala Das"), book("extra2", "Amitav Ghosh")];
        catalog_books.push(book("blocked", "Mahasweta Devi"));
        let catalog = Catalog::new(catalog_books);

        let pool = vec![book("i1", "Ruskin Bond"), book("o1", "Jane Austen")];
        let shaped = balance_pool(
            pool,
            OriginRequirement::Balanced,
            &catalog,
            &classifier,
            &|b| b.id != "blocked",
        );

        assert!(shaped.iter().any(|b| b.id == "extra1"));
        assert!(shaped.iter().any(|b| b.id == "extra2"));
        assert!(!shaped.iter().any(|b| b.id == "blocked"));
    }

    #[test]
    fn excluded_leaves_pool_untouched() {
        let classifier = IndianAuthors::new();
        let catalog = Catalog::new(Vec::new());
        let pool = vec![book("a", "Ruskin Bond"), book("b", "Jane Austen")];
        let shaped = balance_pool(
            pool.clone(),
            OriginRequirement::Excluded,
            &catalog,
            &classifier,
            &|_| true,
        );
        assert_eq!(shaped.len(), pool.len());
    }
}
