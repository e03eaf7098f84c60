//! Result Reconciler
//!
//! Maps backend-chosen ids back onto full book records, enforces the
//! representation quota on the final short list, and supplies deterministic
//! fallbacks when the backend is unavailable or its output is unusable.
//! Every branch here terminates in a suggestion list; nothing raises to the
//! caller.

use std::collections::HashMap;

use tracing::{debug, info};

use super::parse::{DiscoveryBook, RawSuggestion};
use super::representation::{OriginClassifier, OriginRequirement};
use super::{ConciergeReply, Suggestion};
use crate::catalog::{BookRecord, Edition};

const CALM_FIT_RATIONALE: &str = "Chosen for a calm fit with your request.";
const COMPLEMENT_RATIONALE: &str = "A thoughtful choice that complements your request.";
const RESONATE_RATIONALE: &str = "A thoughtful choice that resonates with your request.";

/// Maps raw backend suggestions onto the candidate pool by exact id. Ids the
/// backend invented are dropped silently; if nothing survives, the first
/// three candidates stand in with a generic rationale.
pub fn map_suggestions(candidates: &[BookRecord], raw: &[RawSuggestion]) -> Vec<Suggestion> {
    let by_id: HashMap<&str, &BookRecord> =
        candidates.iter().map(|b| (b.id.as_str(), b)).collect();

    let mapped: Vec<Suggestion> = raw
        .iter()
        .filter_map(|suggestion| {
            by_id.get(suggestion.book_id.as_str()).map(|book| Suggestion {
                book_id: book.id.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                rationale: suggestion.rationale.clone(),
                year: None,
            })
        })
        .collect();

    if !mapped.is_empty() {
        return mapped;
    }

    debug!("No backend suggestion resolved against the pool, defaulting to first candidates");
    candidates
        .iter()
        .take(3)
        .map(|book| Suggestion {
            book_id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            rationale: CALM_FIT_RATIONALE.to_string(),
            year: None,
        })
        .collect()
}

/// Hard representation enforcement on the final short list. Excess items on
/// either side of the target are swapped against the unused remainder of the
/// candidate pool; when the pool cannot supply enough alternates the
/// shortfall is accepted rather than failed.
pub fn enforce_representation(
    suggestions: Vec<Suggestion>,
    candidates: &[BookRecord],
    requirement: OriginRequirement,
    classifier: &dyn OriginClassifier,
) -> Vec<Suggestion> {
    if suggestions.is_empty() {
        return suggestions;
    }

    let total = suggestions.len();
    let (matching, non_matching): (Vec<Suggestion>, Vec<Suggestion>) = suggestions
        .into_iter()
        .partition(|s| classifier.is_target_origin(&s.author));

    let target = match requirement {
        OriginRequirement::Required => {
            // The prompt and pool were already constrained; anything
            // non-matching that slipped through is dropped outright.
            return matching;
        }
        OriginRequirement::Excluded => 0,
        OriginRequirement::Balanced => (total as f32 * 0.5).ceil() as usize,
    };

    let suggested_ids: Vec<String> = matching
        .iter()
        .chain(non_matching.iter())
        .map(|s| s.book_id.clone())
        .collect();
    let unused = |book: &&BookRecord| !suggested_ids.contains(&book.id);

    if matching.len() > target {
        let excess = matching.len() - target;
        let alternates: Vec<Suggestion> = candidates
            .iter()
            .filter(|b| !classifier.is_target_origin(&b.author))
            .filter(unused)
            .take(excess)
            .map(|book| Suggestion {
                book_id: book.id.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                rationale: COMPLEMENT_RATIONALE.to_string(),
                year: None,
            })
            .collect();

        if !alternates.is_empty() {
            info!(
                "Representation over target ({}>{}), swapping {} suggestions",
                matching.len(),
                target,
                alternates.len()
            );
        }

        let mut rebuilt: Vec<Suggestion> = matching.into_iter().take(target).collect();
        rebuilt.extend(non_matching);
        rebuilt.extend(alternates);
        rebuilt.truncate(total);
        rebuilt
    } else if matching.len() < target {
        let needed = target - matching.len();
        let replacements: Vec<Suggestion> = candidates
            .iter()
            .filter(|b| classifier.is_target_origin(&b.author))
            .filter(unused)
            .take(needed)
            .map(|book| Suggestion {
                book_id: book.id.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                rationale: RESONATE_RATIONALE.to_string(),
                year: None,
            })
            .collect();

        if replacements.is_empty() {
            // Shortfall accepted: the pool has nothing to swap in.
            let mut rebuilt = matching;
            rebuilt.extend(non_matching);
            return rebuilt;
        }

        info!(
            "Representation under target ({}<{}), swapping in {} suggestions",
            matching.len(),
            target,
            replacements.len()
        );

        let mut rebuilt = matching;
        rebuilt.extend(replacements);
        rebuilt.extend(non_matching);
        rebuilt.truncate(total);
        rebuilt
    } else {
        let mut rebuilt = matching;
        rebuilt.extend(non_matching);
        rebuilt
    }
}

/// Maps discovery-mode books into suggestions. Ids are synthesized by
/// slugifying title and author: stable for a given book across requests,
/// collisions between distinct books accepted.
pub fn discovery_suggestions(
    books: Vec<DiscoveryBook>,
    requirement: OriginRequirement,
    classifier: &dyn OriginClassifier,
) -> Vec<Suggestion> {
    books
        .into_iter()
        .filter(|book| match requirement {
            OriginRequirement::Required => classifier.is_target_origin(&book.author),
            OriginRequirement::Excluded => !classifier.is_target_origin(&book.author),
            OriginRequirement::Balanced => true,
        })
        .map(|book| Suggestion {
            book_id: format!("discovered-{}-{}", slugify(&book.title), slugify(&book.author)),
            title: book.title,
            author: book.author,
            rationale: book.rationale,
            year: book.year,
        })
        .collect()
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

// ─── Deterministic fallback ──────────────────────────────────────────────────

/// Coarse intent for the canned response table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Travel,
    Light,
    Heavy,
    Default,
}

/// Keyword intent classification for fallback selection.
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    if lower.contains("travel") || lower.contains("commute") {
        Intent::Travel
    } else if lower.contains("light") || lower.contains("gentle") {
        Intent::Light
    } else if lower.contains("heavy") || lower.contains("dense") {
        Intent::Heavy
    } else {
        Intent::Default
    }
}

struct CannedSuggestion {
    book_id: &'static str,
    rationale: &'static str,
}

struct CannedResponse {
    title: &'static str,
    suggestions: &'static [CannedSuggestion],
}

static TRAVEL_RESPONSE: CannedResponse = CannedResponse {
    title: "For the road ahead",
    suggestions: &[
        CannedSuggestion {
            book_id: "a-time-of-gifts",
            rationale: "A walking journey that makes any seat feel like a window.",
        },
        CannedSuggestion {
            book_id: "wind-sand-stars",
            rationale: "Short, luminous chapters that travel well and end cleanly.",
        },
    ],
};

static LIGHT_RESPONSE: CannedResponse = CannedResponse {
    title: "Something light and kind",
    suggestions: &[
        CannedSuggestion {
            book_id: "the-summer-book",
            rationale: "Small island days, nothing heavier than weather and conversation.",
        },
        CannedSuggestion {
            book_id: "the-blue-umbrella",
            rationale: "A gentle hill story you can finish in an evening and keep for years.",
        },
    ],
};

static HEAVY_RESPONSE: CannedResponse = CannedResponse {
    title: "Something with real weight",
    suggestions: &[
        CannedSuggestion {
            book_id: "the-remains-of-the-day",
            rationale: "Quiet on the surface, with a whole life moving underneath.",
        },
        CannedSuggestion {
            book_id: "gitanjali",
            rationale: "Dense in the way a prayer is dense; best read slowly.",
        },
    ],
};

static DEFAULT_RESPONSE: CannedResponse = CannedResponse {
    title: "A few quiet suggestions",
    suggestions: &[
        CannedSuggestion {
            book_id: "malgudi-days",
            rationale: "Small-town stories that ask nothing and give plenty.",
        },
        CannedSuggestion {
            book_id: "wind-sand-stars",
            rationale: "For perspective: deserts, night flights, and what matters.",
        },
        CannedSuggestion {
            book_id: "the-summer-book",
            rationale: "A calm place to land when you don't know what you want.",
        },
    ],
};

fn canned_response(intent: Intent) -> &'static CannedResponse {
    match intent {
        Intent::Travel => &TRAVEL_RESPONSE,
        Intent::Light => &LIGHT_RESPONSE,
        Intent::Heavy => &HEAVY_RESPONSE,
        Intent::Default => &DEFAULT_RESPONSE,
    }
}

/// Deterministic response used whenever the backend is unconfigured,
/// unreachable, or its output is unusable. The canned suggestion list is
/// resolved against the edition set; ids the edition does not carry are
/// dropped, and an edition with no overlap falls back to its own first
/// books. An empty edition yields an explicitly empty list.
pub fn fallback_response(message: &str, edition: &Edition) -> ConciergeReply {
    let intent = classify_intent(message);
    let response = canned_response(intent);
    debug!("Fallback response - intent={:?}", intent);

    let mut suggestions: Vec<Suggestion> = response
        .suggestions
        .iter()
        .filter_map(|canned| {
            edition.book(canned.book_id).map(|book| Suggestion {
                book_id: book.id.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                rationale: canned.rationale.to_string(),
                year: None,
            })
        })
        .collect();

    if suggestions.is_empty() {
        suggestions = edition
            .books
            .iter()
            .take(3)
            .map(|book| Suggestion {
                book_id: book.id.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                rationale: CALM_FIT_RATIONALE.to_string(),
                year: None,
            })
            .collect();
    }

    ConciergeReply {
        title: response.title.to_string(),
        suggestions,
        discovery_mode: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EditionBook, EditorialNote};
    use crate::concierge::representation::IndianAuthors;

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

    fn raw(id: &str) -> RawSuggestion {
        RawSuggestion {
            book_id: id.to_string(),
            rationale: "fits".to_string(),
        }
    }

    fn edition_with(ids: &[&str]) -> Edition {
        Edition {
            id: "ed".to_string(),
            title: "Edition".to_string(),
            start_date: "2026-02-01".to_string(),
            end_date: "2026-02-28".to_string(),
            editorial_note: EditorialNote {
                title: "n".to_string(),
                body: "b".to_string(),
            },
            books: ids
                .iter()
                .map(|id| EditionBook {
                    id: id.to_string(),
                    title: format!("Edition {id}"),
                    author: "Curator".to_string(),
                    why_this_book: "w".to_string(),
                    best_context: "c".to_string(),
                    estimated_sessions: 4,
                    genres: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn invented_ids_are_dropped_silently() {
        let candidates = vec![book("real", "Someone")];
        let mapped = map_suggestions(&candidates, &[raw("real"), raw("invented")]);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].book_id, "real");
    }

    #[test]
    fn exhausted_mapping_defaults_to_first_three() {
        let candidates = vec![
            book("a", "X"),
            book("b", "Y"),
            book("c", "Z"),
            book("d", "W"),
        ];
        let mapped = map_suggestions(&candidates, &[raw("nope")]);
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[0].rationale, CALM_FIT_RATIONALE);
    }

    #[test]
    fn balanced_enforcement_bounds_matching_count() {
        let classifier = IndianAuthors::new();
        let candidates = vec![
            book("i1", "Ruskin Bond"),
            book("i2", "Anita Desai"),
            book("i3", "Sudha Murty"),
            book("o1", "Jane Austen"),
            book("o2", "George Eliot"),
        ];
        // All three picks matching: target for 3 is 2.
        let picks = map_suggestions(&candidates, &[raw("i1"), raw("i2"), raw("i3")]);
        let balanced = enforce_representation(
            picks,
            &candidates,
            OriginRequirement::Balanced,
            &classifier,
        );
        assert_eq!(balanced.len(), 3);
        let matching = balanced
            .iter()
            .filter(|s| classifier.is_target_origin(&s.author))
            .count();
        assert!(matching >= 1 && matching <= 2, "matching={matching}");

        // No pick matching: swap some in.
        let picks = map_suggestions(&candidates, &[raw("o1"), raw("o2"), raw("i1")]);
        let balanced = enforce_representation(
            picks,
            &candidates,
            OriginRequirement::Balanced,
            &classifier,
        );
        let matching = balanced
            .iter()
            .filter(|s| classifier.is_target_origin(&s.author))
            .count();
        assert!(matching >= 1 && matching <= 2, "matching={matching}");
    }

    #[test]
    fn required_enforcement_keeps_only_matching() {
        let classifier = IndianAuthors::new();
        let candidates = vec![book("i1", "Ruskin Bond"), book("o1", "Jane Austen")];
        let picks = map_suggestions(&candidates, &[raw("i1"), raw("o1")]);
        let enforced = enforce_representation(
            picks,
            &candidates,
            OriginRequirement::Required,
            &classifier,
        );
        assert_eq!(enforced.len(), 1);
        assert_eq!(enforced[0].book_id, "i1");
    }

    #[test]
    fn excluded_enforcement_swaps_matching_out() {
        let classifier = IndianAuthors::new();
        let candidates = vec![
            book("i1", "Ruskin Bond"),
            book("o1", "Jane Austen"),
            book("o2", "George Eliot"),
        ];
        let picks = map_suggestions(&candidates, &[raw("i1"), raw("o1")]);
        let enforced = enforce_representation(
            picks,
            &candidates,
            OriginRequirement::Excluded,
            &classifier,
        );
        assert!(enforced
            .iter()
            .all(|s| !classifier.is_target_origin(&s.author)));
        assert_eq!(enforced.len(), 2);
    }

    #[test]
    fn shortfall_is_accepted() {
        let classifier = IndianAuthors::new();
        // Nothing matching anywhere: balanced target cannot be met.
        let candidates = vec![book("o1", "Jane Austen"), book("o2", "George Eliot")];
        let picks = map_suggestions(&candidates, &[raw("o1"), raw("o2")]);
        let enforced = enforce_representation(
            picks,
            &candidates,
            OriginRequirement::Balanced,
            &classifier,
        );
        assert_eq!(enforced.len(), 2);
    }

    #[test]
    fn intent_classification_table() {
        assert_eq!(classify_intent("something for my commute"), Intent::Travel);
        assert_eq!(classify_intent("a light read"), Intent::Light);
        assert_eq!(classify_intent("dense and heavy please"), Intent::Heavy);
        assert_eq!(classify_intent("what next"), Intent::Default);
    }

    #[test]
    fn fallback_resolves_against_edition() {
        let edition = edition_with(&["malgudi-days", "wind-sand-stars"]);
        let reply = fallback_response("what should I read next", &edition);
        assert!(!reply.suggestions.is_empty());
        for suggestion in &reply.suggestions {
            assert!(edition.book(&suggestion.book_id).is_some());
        }
    }

    #[test]
    fn fallback_with_foreign_edition_uses_its_first_books() {
        let edition = edition_with(&["x1", "x2", "x3", "x4"]);
        let reply = fallback_response("anything", &edition);
        assert_eq!(reply.suggestions.len(), 3);
        assert_eq!(reply.suggestions[0].book_id, "x1");
    }

    #[test]
    fn fallback_with_empty_edition_is_explicitly_empty() {
        let edition = edition_with(&[]);
        let reply = fallback_response("anything", &edition);
        assert!(reply.suggestions.is_empty());
        assert!(!reply.title.is_empty());
    }

    #[test]
    fn discovery_ids_are_slugified_and_stable() {
        let books = vec![DiscoveryBook {
            title: "The Boy, the Mole, the Fox and the Horse".to_string(),
            author: "Charlie Mackesy".to_string(),
            rationale: "gentle".to_string(),
            year: Some(2019),
        }];
        let classifier = IndianAuthors::new();
        let suggestions =
            discovery_suggestions(books, OriginRequirement::Balanced, &classifier);
        assert_eq!(
            suggestions[0].book_id,
            "discovered-the-boy-the-mole-the-fox-and-the-horse-charlie-mackesy"
        );
        assert_eq!(suggestions[0].year, Some(2019));
    }

    #[test]
    fn discovery_required_filters_to_matching_authors() {
        let classifier = IndianAuthors::new();
        let books = vec![
            DiscoveryBook {
                title: "The God of Small Things".to_string(),
                author: "Arundhati Roy".to_string(),
                rationale: "r".to_string(),
                year: None,
            },
            DiscoveryBook {
                title: "Mrs Dalloway".to_string(),
                author: "Virginia Woolf".to_string(),
                rationale: "r".to_string(),
                year: None,
            },
        ];
        let suggestions =
            discovery_suggestions(books, OriginRequirement::Required, &classifier);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].author, "Arundhati Roy");
    }
}
