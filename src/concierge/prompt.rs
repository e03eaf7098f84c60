//! Prompt Builder
//!
//! One builder for every concierge-shaped backend call, parameterized by a
//! constraint struct. Discovery and catalog-constrained requests share the
//! same entry point; the constraints decide which blocks appear.

use super::representation::OriginRequirement;
use crate::catalog::BookRecord;
use crate::context::ReadingContext;

/// Constraints active for one request.
#[derive(Debug, Clone)]
pub struct PromptConstraints {
    pub child_safety: bool,
    pub age_hint: Option<u8>,
    pub origin: OriginRequirement,
    /// Number of ids the client already saw; asks the backend for different
    /// books.
    pub exclusions: usize,
}

/// A fully built backend request.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

const CONCIERGE_SYSTEM: &str = "You are a deeply perceptive literary concierge with exceptional emotional intelligence. You understand what readers truly need based on their emotional state, life context, and reading intentions - not just their surface request.\n\nYour superpower: matching the right book to the right moment in someone's life. A person feeling \"stuck\" needs energizing momentum, not more contemplation. Someone lonely needs warm human connection. Someone grieving needs gentle presence, not solutions.\n\nAnalyze deeply. Recommend thoughtfully. Write rationales that show you truly understand their moment.";

const SUMMARY_SYSTEM: &str = "You are a literary curator who writes beautiful, evocative book summaries that capture the soul of a story. Your writing is poetic yet concise, inviting yet precise.";

/// Discovery request: the backend recommends real-world books from its own
/// knowledge; no candidate list is supplied.
pub fn discovery_prompt(message: &str, constraints: &PromptConstraints) -> Prompt {
    let age_line = constraints
        .age_hint
        .map(|age| format!("\nAge: {age} years old"))
        .unwrap_or_default();

    let safety_block = if constraints.child_safety {
        format!(
            "\nCHILDREN'S REQUEST (Age {}):\n- ONLY children's books appropriate for this age\n- Picture books, chapter books, or early readers\n- NO adult books, textbooks, or advanced literature\n",
            constraints
                .age_hint
                .map(|a| a.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        )
    } else {
        String::new()
    };

    let origin_block = match constraints.origin {
        OriginRequirement::Required => {
            "\nCRITICAL - INDIAN AUTHORS EXPLICITLY REQUESTED:\n- You MUST recommend ONLY Indian authors (100% Indian, 0% international)\n- Examples: Arundhati Roy, Anita Desai, Kamala Das, Mahasweta Devi, Bama, Shashi Deshpande, Manju Kapur, Ismat Chughtai\n- If you cannot find 3 Indian books matching the request, return fewer suggestions rather than including non-Indian authors\n"
        }
        OriginRequirement::Balanced => {
            "\nINDIAN READER:\n- Prioritize Indian authors when possible\n- Include books relevant to Indian context\n"
        }
        OriginRequirement::Excluded => "",
    };

    let user = format!(
        r#"You are a knowledgeable book expert helping find books for readers.

User's request: "{message}"{age_line}

Task: Recommend 3 specific, real books that perfectly match this request.
{safety_block}{origin_block}
For each book provide:
1. Exact title and author
2. Why this book is perfect for their specific need (1-2 sentences)

Return JSON with this format:
{{
  "title": "For your need",
  "books": [
    {{
      "title": "Book Title",
      "author": "Author Name",
      "rationale": "Why this book fits their need perfectly",
      "year": 2020
    }}
  ]
}}

Important:
- Recommend REAL books that exist
- Match the specific need (teaching concepts, age-appropriate, etc.)
- Use warm, personal language in rationales
- Return 3 books maximum"#
    );

    Prompt {
        system: String::new(),
        user,
        max_tokens: 1000,
        temperature: 0.7,
    }
}

/// Catalog-constrained request: only books from the candidate list may be
/// suggested.
pub fn catalog_prompt(
    message: &str,
    candidates: &[BookRecord],
    context: Option<&ReadingContext>,
    constraints: &PromptConstraints,
) -> Prompt {
    let safety_block = if constraints.child_safety {
        let age_label = constraints
            .age_hint
            .map(|a| format!("AGE {a}"))
            .unwrap_or_else(|| "CHILDREN'S".to_string());
        let examples = match constraints.age_hint {
            Some(age) if age <= 8 => "Picture books, simple stories with illustrations",
            _ => "Young adult novels, chapter books, age-appropriate fiction",
        };
        format!(
            "\n\nCRITICAL CONTENT SAFETY - {age_label} REQUEST:\nYou MUST:\n- ONLY recommend books written for this reader's age\n- NO academic texts, anthologies, grammar books, or advanced literature\n- ONLY children's books, picture books, early readers, or age-appropriate stories\n- Examples of GOOD suggestions: {examples}\n- Examples of BAD suggestions: anthologies, essay collections, grammar textbooks, classic literature not written for children"
        )
    } else {
        String::new()
    };

    let origin_block = match constraints.origin {
        OriginRequirement::Required => {
            "\n\nCRITICAL - INDIAN AUTHORS EXPLICITLY REQUESTED:\nYou MUST recommend ONLY books by Indian authors (100% Indian):\n- REQUIRED: All suggestions must be Indian authors\n- DO NOT recommend any Western/international authors\n- The candidate list has been filtered to ONLY Indian authors".to_string()
        }
        OriginRequirement::Balanced => {
            "\n\nINDIAN READER - BALANCED REPRESENTATION:\nYou MUST maintain 50/50 balance in your 3 selections:\n- REQUIRED: Select EXACTLY 1-2 Indian authors AND 1-2 international authors (NOT all Indian, NOT all international)\n- For 3 suggestions: 2 Indian + 1 international OR 1 Indian + 2 international\n- Choose based on best fit for the request, but maintain the balance requirement".to_string()
        }
        OriginRequirement::Excluded => String::new(),
    };

    let exclusion_note = if constraints.exclusions > 0 {
        format!(
            "\n\nNote: User is asking for MORE suggestions (beyond the {} books already suggested). Provide different books that also match their need.",
            constraints.exclusions
        )
    } else {
        String::new()
    };

    let context_block = context.map(context_info).unwrap_or_default();

    let listing: String = candidates
        .iter()
        .map(|book| {
            format!(
                "- {} | {} - {} | genres: {} | moods: {} | {}\n",
                book.id,
                book.title,
                book.author,
                join_or_na(&book.genres),
                join_or_na(&book.moods),
                book.description.as_deref().unwrap_or(""),
            )
        })
        .collect();

    let user = format!(
        r#"You are a deeply perceptive literary concierge for a physical-book reading room. Your gift is understanding what readers truly need emotionally, contextually, and intellectually.{safety_block}{origin_block}

ANALYZE THE REQUEST FIRST:

User's request: "{message}"{exclusion_note}{context_block}

1. EMOTIONAL STATE - What are they feeling?
   - Stuck/Overwhelmed/Burned out -> Need: Energizing, accessible books with forward momentum (NOT contemplative/slow)
   - Anxious/Restless -> Need: Immersive escape OR gentle grounding depending on tone
   - Lonely/Disconnected -> Need: Warm books with strong human connection and intimacy
   - Grieving/Heavy heart -> Need: Gentle wisdom that sits with sadness, not "fix-it" books
   - Drained/Exhausted -> Need: Light, replenishing reads; avoid demanding books
   - Seeking joy/delight -> Need: Playful, life-affirming, delightful books
   - Scattered/Distracted -> Need: Books about essentialism, clarity, priorities

2. LIFE CONTEXT - What's happening in their life?
   - New parent/caregiver -> Short sessions, life-affirming, easy to pick up/put down
   - Career change/transition -> Stories of reinvention, finding purpose, change
   - Dealing with loss -> Avoid cheerfulness; offer presence and gentle wisdom
   - Travel/vacation -> Place-based immersion, atmospheric escape
   - Seasonal mood -> Winter coziness, summer lightness, autumn reflection

3. SMART AVOIDANCE - What to skip?
   - "Light" requested -> Avoid heavy/tragic/dense/dark
   - "Overwhelmed" -> Avoid philosophical/abstract/demanding
   - "Quick" -> Avoid multi-volume epics or challenging prose
   - "Gentle" -> Avoid violence/harshness/cynicism
   - "Energizing" -> Avoid slow/contemplative/melancholic

RECOMMENDATION STRATEGY:

- Match emotional remedy to actual need (not surface request)
- Write rationales that show you understand their situation
- Use warm, personal language: "When you're feeling X, this offers Y"
- Suggest 2-3 books with DISTINCT approaches to their need
- IMPORTANT: Prioritize VARIETY - choose books with different authors, genres, and tones
- Mix well-known and lesser-known books when possible

Only recommend physical books from the provided candidate list. Do not mention ebooks, summaries, or reading in-app.

Return JSON only with shape: {{"title": string, "suggestions": [{{"bookId": string, "rationale": string}}]}}

The title should be 3-6 words that capture what you're offering (e.g., "For that overwhelmed feeling", "When you need companionship").

Rationales should be personal and show understanding: "When focus is scattered, this absorbs gently" not generic "You might enjoy this."

Candidates:
{listing}"#
    );

    Prompt {
        system: CONCIERGE_SYSTEM.to_string(),
        user,
        max_tokens: 1500,
        temperature: 0.9,
    }
}

/// Book-summary request.
pub fn summary_prompt(title: &str, author: &str) -> Prompt {
    let by_line = if author.is_empty() {
        String::new()
    } else {
        format!(" by {author}")
    };
    let user = format!(
        "Book: {title}{by_line}.\n\nProvide:\n1. Author name (if not provided or if you can identify it)\n2. A beautiful, evocative 2-3 sentence summary that captures the essence and atmosphere of this book. Use poetic, gentle language that invites the reader into the world of the story. Focus on themes, mood, and emotional resonance rather than plot details. Avoid spoilers. Keep it under 60 words.\n\nReturn JSON only: {{\"author\": \"Author Name\", \"summary\": \"...\"}}\n\nIf author is unknown, return empty string for author field."
    );

    Prompt {
        system: SUMMARY_SYSTEM.to_string(),
        user,
        max_tokens: 200,
        temperature: 0.4,
    }
}

fn join_or_na(items: &[String]) -> String {
    if items.is_empty() {
        "n/a".to_string()
    } else {
        items.join(", ")
    }
}

fn context_info(context: &ReadingContext) -> String {
    let weather_line = context
        .weather
        .as_ref()
        .map(|w| format!("\n- Weather: {}, {}C", w.condition, w.temp))
        .unwrap_or_default();

    let weather_hint = match context.weather.as_ref() {
        Some(w) if w.condition.contains("Rain") => {
            "Rainy weather pairs well with cozy, introspective reads."
        }
        Some(w) if w.condition.contains("Sun") || w.condition.contains("Clear") => {
            "Clear weather invites bright, energizing books."
        }
        _ => match context.season {
            crate::context::Season::Winter => "Winter calls for contemplative, intimate reads.",
            crate::context::Season::Summer => "Summer energy suits lighter, adventurous books.",
            _ => "",
        },
    };

    format!(
        "\n\nCurrent Reading Context:\n- Location: {}\n- Season: {}\n- Time of Day: {}{}\n- Reading Mood: {}\n\nUSE THIS CONTEXT: Factor in the weather, season, and time of day when making recommendations. {}",
        context.location.as_deref().unwrap_or("Not specified"),
        context.season,
        context.time_of_day,
        weather_line,
        context.reading_mood,
        weather_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{reading_context, Weather};
    use chrono::TimeZone;

    fn constraints() -> PromptConstraints {
        PromptConstraints {
            child_safety: false,
            age_hint: None,
            origin: OriginRequirement::Balanced,
            exclusions: 0,
        }
    }

    fn book(id: &str) -> BookRecord {
        BookRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            author: "Author".to_string(),
            genres: vec!["poetry".to_string()],
            moods: Vec::new(),
            subjects: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn constraint_toggles_control_blocks() {
        let base = catalog_prompt("hello", &[book("a")], None, &constraints());
        assert!(base.user.contains("BALANCED REPRESENTATION"));
        assert!(!base.user.contains("CONTENT SAFETY"));

        let child = catalog_prompt(
            "hello",
            &[book("a")],
            None,
            &PromptConstraints {
                child_safety: true,
                age_hint: Some(7),
                ..constraints()
            },
        );
        assert!(child.user.contains("CRITICAL CONTENT SAFETY - AGE 7"));
        assert!(child.user.contains("Picture books"));

        let required = catalog_prompt(
            "hello",
            &[book("a")],
            None,
            &PromptConstraints {
                origin: OriginRequirement::Required,
                ..constraints()
            },
        );
        assert!(required.user.contains("ONLY books by Indian authors"));

        let excluded = catalog_prompt(
            "hello",
            &[book("a")],
            None,
            &PromptConstraints {
                origin: OriginRequirement::Excluded,
                ..constraints()
            },
        );
        assert!(!excluded.user.contains("INDIAN"));
    }

    #[test]
    fn exclusion_note_appears_with_count() {
        let prompt = catalog_prompt(
            "more please",
            &[book("a")],
            None,
            &PromptConstraints {
                exclusions: 3,
                ..constraints()
            },
        );
        assert!(prompt.user.contains("beyond the 3 books already suggested"));
    }

    #[test]
    fn candidates_are_listed_with_ids() {
        let prompt = catalog_prompt("hello", &[book("b-42")], None, &constraints());
        assert!(prompt.user.contains("- b-42 | Title b-42"));
        assert!(prompt.user.contains("genres: poetry"));
        assert!(prompt.user.contains("moods: n/a"));
    }

    #[test]
    fn context_block_folds_in_weather() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        let ctx = reading_context(
            Some("Mumbai, India".to_string()),
            Some(Weather {
                condition: "Rain".to_string(),
                temp: 22,
                description: "monsoon shower".to_string(),
            }),
            now,
        );
        let prompt = catalog_prompt("hello", &[book("a")], Some(&ctx), &constraints());
        assert!(prompt.user.contains("Weather: Rain, 22C"));
        assert!(prompt.user.contains("cozy, introspective reads"));
    }

    #[test]
    fn discovery_prompt_carries_age_and_origin() {
        let prompt = discovery_prompt(
            "books for my 6 year old",
            &PromptConstraints {
                child_safety: true,
                age_hint: Some(6),
                origin: OriginRequirement::Balanced,
                exclusions: 0,
            },
        );
        assert!(prompt.user.contains("Age: 6 years old"));
        assert!(prompt.user.contains("CHILDREN'S REQUEST"));
        assert!(prompt.user.contains("\"books\""));
        assert_eq!(prompt.max_tokens, 1000);
    }

    #[test]
    fn sampling_parameters_per_shape() {
        let catalog = catalog_prompt("hello", &[], None, &constraints());
        assert_eq!(catalog.max_tokens, 1500);
        assert!((catalog.temperature - 0.9).abs() < f32::EPSILON);

        let summary = summary_prompt("A Book", "An Author");
        assert_eq!(summary.max_tokens, 200);
        assert!(summary.user.contains("A Book by An Author"));
    }
}
