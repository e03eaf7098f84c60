//! Request Signals
//!
//! Per-request detection of audience, origin preference, and discovery
//! triggers. Pure predicates over the lowered message text, evaluated once
//! before pool construction.

use regex::Regex;

use super::representation::OriginRequirement;

/// Phrases that explicitly exclude target-origin authors.
const EXCLUDE_ORIGIN_PHRASES: &[&str] = &[
    "western author",
    "american author",
    "british author",
    "european author",
    "non-indian",
];

/// Phrases that explicitly request target-origin authors only.
const REQUIRE_ORIGIN_PHRASES: &[&str] = &[
    "indian author",
    "indian woman author",
    "indian women author",
    "indian writer",
    "by indian",
    "from india",
];

const CHILD_KEYWORDS: &[&str] = &["kid", "child", "young", "family", "age appropriate"];

/// Specialized-topic triggers that route to discovery mode: requests the
/// local catalog rarely covers well.
const DISCOVERY_TOPICS: &[&str] = &[
    "teach",
    "learn about",
    "explain",
    "finance",
    "money",
    "science",
    "feminism",
    "feminist",
    "history of",
];

/// Everything the pipeline needs to know about a message besides its tags.
#[derive(Debug, Clone)]
pub struct RequestSignals {
    /// Age parsed from "N year old" phrasing, if present.
    pub requested_age: Option<u8>,
    /// Child-safety context: explicit keywords, or a requested age of 12 or
    /// under.
    pub childrens_request: bool,
    /// Origin preference derived from explicit phrasing.
    pub origin: OriginRequirement,
}

impl RequestSignals {
    /// Whether the catalog should be bypassed in favor of asking the backend
    /// to recommend from world knowledge.
    pub fn use_discovery(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.childrens_request || DISCOVERY_TOPICS.iter().any(|t| lower.contains(t))
    }
}

/// Extracts request signals from the raw message.
pub fn extract_signals(message: &str) -> RequestSignals {
    let lower = message.to_lowercase();

    let requested_age = Regex::new(r"(\d{1,2})[\s-]?year[\s-]?old")
        .ok()
        .and_then(|re| re.captures(&lower))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok());

    let childrens_request = CHILD_KEYWORDS.iter().any(|k| lower.contains(k))
        || requested_age.map(|age| age <= 12).unwrap_or(false);

    let origin = if EXCLUDE_ORIGIN_PHRASES.iter().any(|p| lower.contains(p)) {
        OriginRequirement::Excluded
    } else if REQUIRE_ORIGIN_PHRASES.iter().any(|p| lower.contains(p)) {
        OriginRequirement::Required
    } else {
        OriginRequirement::Balanced
    };

    RequestSignals {
        requested_age,
        childrens_request,
        origin,
    }
}
