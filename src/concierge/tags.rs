//! Tag Deriver
//!
//! Maps a free-text mood/need statement onto catalog mood and genre tags via
//! a fixed keyword rule table. Rules fire independently and tags accumulate
//! in rule order; downstream matching treats the lists as bags, so duplicate
//! tags are harmless. Deterministic, side-effect-free.

/// One rule group: any trigger substring fires the whole group.
struct Rule {
    triggers: &'static [&'static str],
    moods: &'static [&'static str],
    genres: &'static [&'static str],
}

const RULES: &[Rule] = &[
    // Energizing / uplifting needs (stuck, overwhelmed, drained)
    Rule {
        triggers: &[
            "stuck", "overwhelm", "drained", "burned", "burnout", "detach",
            "un-stuck", "unstuck", "energiz", "uplift", "motivat",
        ],
        moods: &["hopeful", "adventurous", "curious", "expansive"],
        genres: &[],
    },
    // Anxiety / restless
    Rule {
        triggers: &["anxious", "restless", "nervous", "worry"],
        moods: &["grounded", "restorative", "gentle"],
        genres: &[],
    },
    // Lonely / disconnected
    Rule {
        triggers: &["lonely", "alone", "disconnect", "isolated"],
        moods: &["warm", "intimate", "tender"],
        genres: &[],
    },
    // Grief / sadness
    Rule {
        triggers: &["grief", "loss", "sad", "heavy heart"],
        moods: &["gentle", "tender", "contemplative"],
        genres: &[],
    },
    // Joy / delight
    Rule {
        triggers: &["joy", "delight", "happy", "uplift", "cheer"],
        moods: &["hopeful", "warm", "cozy"],
        genres: &[],
    },
    // Calm / grounding
    Rule {
        triggers: &["slow", "ground", "still", "peace", "calm", "meditat"],
        moods: &["meditative", "quiet", "contemplative", "grounded"],
        genres: &[],
    },
    // Focus / clarity
    Rule {
        triggers: &[
            "focus", "clarity", "clear mind", "priorities", "what matters",
            "distract", "scattered", "attention",
        ],
        moods: &["focused", "grounded", "contemplative", "quiet"],
        genres: &["philosophy", "essays"],
    },
    // Children / family content
    Rule {
        triggers: &["kid", "child", "young", "family", "age appropriate"],
        moods: &["warm", "hopeful", "gentle"],
        genres: &["childrens", "young-adult", "middle-grade"],
    },
    // Indian context
    Rule {
        triggers: &[
            "india", "indian", "diwali", "holi", "monsoon", "delhi", "mumbai",
            "bengal",
        ],
        moods: &[],
        genres: &["indian-literature", "south-asian"],
    },
    // Light / gentle requests
    Rule {
        triggers: &["light", "gentle"],
        moods: &["gentle", "hopeful", "warm"],
        genres: &[],
    },
    // Deep / challenging requests
    Rule {
        triggers: &["deep", "dense", "challeng", "profound"],
        moods: &["contemplative", "reflective", "expansive"],
        genres: &[],
    },
    // Comfort
    Rule {
        triggers: &["comfort", "cozy"],
        moods: &["cozy", "warm", "restorative"],
        genres: &[],
    },
    // Explicit mood keywords
    Rule {
        triggers: &["quiet"],
        moods: &["quiet"],
        genres: &[],
    },
    Rule {
        triggers: &["warm"],
        moods: &["warm"],
        genres: &[],
    },
    Rule {
        triggers: &["adventurous", "adventure"],
        moods: &["adventurous", "expansive"],
        genres: &[],
    },
    // Genre keywords
    Rule {
        triggers: &["travel"],
        moods: &[],
        genres: &["travel"],
    },
    Rule {
        triggers: &["poetry", "poem"],
        moods: &[],
        genres: &["poetry"],
    },
    Rule {
        triggers: &["mystery", "detective"],
        moods: &[],
        genres: &["mystery"],
    },
    Rule {
        triggers: &["history", "historical"],
        moods: &[],
        genres: &["history", "historical"],
    },
    Rule {
        triggers: &["philosophy", "stoic"],
        moods: &[],
        genres: &["philosophy"],
    },
    Rule {
        triggers: &["romance", "love story"],
        moods: &[],
        genres: &["romance"],
    },
    Rule {
        triggers: &["fantasy", "magical"],
        moods: &[],
        genres: &["fantasy"],
    },
    Rule {
        triggers: &["science", "sci-fi", "scifi"],
        moods: &[],
        genres: &["science-fiction"],
    },
    Rule {
        triggers: &["essay"],
        moods: &[],
        genres: &["essays"],
    },
    Rule {
        triggers: &["memoir", "autobiography"],
        moods: &[],
        genres: &["memoir", "biography"],
    },
    Rule {
        triggers: &["nature", "outdoors"],
        moods: &[],
        genres: &["nature"],
    },
    Rule {
        triggers: &["short stor"],
        moods: &[],
        genres: &["short-stories"],
    },
    Rule {
        triggers: &["classic"],
        moods: &[],
        genres: &["classics"],
    },
    Rule {
        triggers: &["literary", "literature"],
        moods: &[],
        genres: &["literary"],
    },
];

/// Mood and genre tags derived from a message. Bag semantics: order follows
/// the rule table, duplicates allowed.
#[derive(Debug, Clone, Default)]
pub struct DerivedTags {
    pub moods: Vec<String>,
    pub genres: Vec<String>,
}

impl DerivedTags {
    pub fn is_empty(&self) -> bool {
        self.moods.is_empty() && self.genres.is_empty()
    }
}

/// Derives mood/genre tags from free text. Case-insensitive substring
/// matching; every rule group is evaluated, none are mutually exclusive.
pub fn derive_tags(message: &str) -> DerivedTags {
    let normalized = message.to_lowercase();
    let mut tags = DerivedTags::default();

    for rule in RULES {
        if rule.triggers.iter().any(|t| normalized.contains(t)) {
            tags.moods.extend(rule.moods.iter().map(|m| m.to_string()));
            tags.genres.extend(rule.genres.iter().map(|g| g.to_string()));
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stuck_and_overwhelmed_derive_energizing_moods() {
        let tags = derive_tags("stuck and overwhelmed");
        for expected in ["hopeful", "adventurous", "curious", "expansive"] {
            assert!(tags.moods.iter().any(|m| m == expected), "missing {expected}");
        }
    }

    #[test]
    fn rule_groups_accumulate() {
        let tags = derive_tags("feeling lonely on a quiet evening, maybe some poetry");
        assert!(tags.moods.iter().any(|m| m == "warm"));
        assert!(tags.moods.iter().any(|m| m == "quiet"));
        assert!(tags.genres.iter().any(|g| g == "poetry"));
    }

    #[test]
    fn duplicates_are_allowed() {
        // "uplift" appears in two rule groups; both fire.
        let tags = derive_tags("something uplifting please");
        let hopeful_count = tags.moods.iter().filter(|m| *m == "hopeful").count();
        assert_eq!(hopeful_count, 2);
    }

    #[test]
    fn table_driven_genre_rules() {
        let cases = [
            ("a good mystery", "mystery"),
            ("historical fiction", "history"),
            ("something stoic", "philosophy"),
            ("a sweeping fantasy", "fantasy"),
            ("sci-fi for the weekend", "science-fiction"),
            ("short stories", "short-stories"),
            ("a classic", "classics"),
        ];
        for (message, genre) in cases {
            let tags = derive_tags(message);
            assert!(
                tags.genres.iter().any(|g| g == genre),
                "{message} should derive {genre}"
            );
        }
    }

    #[test]
    fn no_triggers_no_tags() {
        assert!(derive_tags("xyzzy").is_empty());
    }
}
