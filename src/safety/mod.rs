//! Audience Safety
//!
//! Content filtering for child and age-restricted requests. Matching is
//! case-insensitive substring over the combined title, author, and
//! description text.

use tracing::debug;

use crate::catalog::BookRecord;

/// Keywords that disqualify an entry for a children's request: adult content,
/// academic apparatus, and literary works far outside a child's range.
const DISALLOWED_KEYWORDS: &[&str] = &[
    // Adult content
    "kama sutra",
    "kamasutra",
    "erotic",
    "adult",
    "mature",
    "explicit",
    "sex",
    // Academic or advanced texts
    "anthology",
    "essays",
    "grammar",
    "philosophy",
    "critique",
    "theory",
    "norton",
    "oxford companion",
    "encyclopedia",
    "dictionary",
    "handbook",
    "montaigne",
    "nietzsche",
    "kafka",
    "joyce",
    "woolf",
    // Complex literary works
    "ulysses",
    "finnegans wake",
    "being and time",
    "capital",
];

/// Title markers that suggest a multi-volume academic work, filtered out for
/// readers under eight.
const VOLUME_MARKERS: &[&str] = &["volume", "part i"];

/// Result of an audience check.
#[derive(Debug, Clone)]
pub struct AudienceVerdict {
    pub is_safe: bool,
    pub reasons: Vec<String>,
}

impl AudienceVerdict {
    fn safe() -> Self {
        Self {
            is_safe: true,
            reasons: Vec::new(),
        }
    }

    fn add_reason(&mut self, reason: impl Into<String>) {
        self.is_safe = false;
        self.reasons.push(reason.into());
    }
}

/// Filter for child-safety contexts. Constructed per request with the age
/// hint extracted from the message, if any.
pub struct AudienceFilter {
    age_hint: Option<u8>,
}

impl AudienceFilter {
    pub fn new(age_hint: Option<u8>) -> Self {
        Self { age_hint }
    }

    /// Checks one entry's combined text against the disallowed keyword set.
    pub fn check_text(&self, title: &str, author: &str, description: &str) -> AudienceVerdict {
        let mut verdict = AudienceVerdict::safe();
        let combined = format!(
            "{} {} {}",
            title.to_lowercase(),
            author.to_lowercase(),
            description.to_lowercase()
        );

        for keyword in DISALLOWED_KEYWORDS {
            if combined.contains(keyword) {
                verdict.add_reason(format!("disallowed keyword: {keyword}"));
            }
        }

        // Very young readers: also reject titles that look like academic series.
        if let Some(age) = self.age_hint {
            if age < 8 {
                let title_lower = title.to_lowercase();
                if VOLUME_MARKERS.iter().any(|m| title_lower.contains(m)) {
                    verdict.add_reason("multi-volume academic work");
                }
            }
        }

        verdict
    }

    pub fn check_book(&self, book: &BookRecord) -> AudienceVerdict {
        self.check_text(
            &book.title,
            &book.author,
            book.description.as_deref().unwrap_or(""),
        )
    }

    /// Removes unsafe entries from a candidate pool in place.
    pub fn retain_safe(&self, pool: &mut Vec<BookRecord>) {
        let before = pool.len();
        pool.retain(|book| self.check_book(book).is_safe);
        let removed = before - pool.len();
        if removed > 0 {
            debug!("Audience filter removed {} entries", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, description: &str) -> BookRecord {
        BookRecord {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            author: author.to_string(),
            genres: Vec::new(),
            moods: Vec::new(),
            subjects: Vec::new(),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn blocks_adult_and_academic_content() {
        let filter = AudienceFilter::new(None);
        assert!(!filter.check_book(&book("The Kama Sutra", "Vatsyayana", "")).is_safe);
        assert!(!filter.check_book(&book("Collected Essays", "Montaigne", "")).is_safe);
        assert!(filter.check_book(&book("The Blue Umbrella", "Ruskin Bond", "a hill story")).is_safe);
    }

    #[test]
    fn keyword_matches_description_too() {
        let filter = AudienceFilter::new(None);
        let flagged = filter.check_book(&book("Plain Title", "Someone", "an explicit memoir"));
        assert!(!flagged.is_safe);
        assert!(!flagged.reasons.is_empty());
    }

    #[test]
    fn volume_titles_blocked_under_eight_only() {
        let young = AudienceFilter::new(Some(6));
        let older = AudienceFilter::new(Some(10));
        let series = book("Collected Works Volume 2", "Someone", "");
        assert!(!young.check_book(&series).is_safe);
        assert!(older.check_book(&series).is_safe);
    }

    #[test]
    fn retain_safe_prunes_pool() {
        let filter = AudienceFilter::new(Some(6));
        let mut pool = vec![
            book("Gentle Stories", "A Writer", "bedtime tales"),
            book("Erotic Poems", "B Writer", ""),
        ];
        filter.retain_safe(&mut pool);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "Gentle Stories");
    }
}
