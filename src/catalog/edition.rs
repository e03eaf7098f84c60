//! Editions
//!
//! A small, time-boxed curated book list. The static edition ships with the
//! corpus and is capped at seven books; the AI edition is regenerated at most
//! once per calendar month by asking the generative backend for a themed
//! twenty-book listing, cached under the month key.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::GenerativeBackend;
use crate::catalog::{BookRecord, Catalog};
use crate::concierge::parse;
use crate::concierge::representation::OriginClassifier;
use crate::context::ReadingContext;
use crate::error::ConciergeError;
use crate::store::BlobStore;

/// Hard cap on the active curated edition.
pub const MAX_EDITION_BOOKS: usize = 7;

/// Cap on the AI-curated monthly listing.
pub const MAX_AI_EDITION_BOOKS: usize = 20;

/// Minimum share of target-origin authors in an AI edition.
const ORIGIN_FLOOR: f32 = 0.4;

const AI_EDITION_STORE_KEY: &str = "edition:ai";

/// A curated, higher-trust entry with narrative fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditionBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub why_this_book: String,
    pub best_context: String,
    pub estimated_sessions: u32,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorialNote {
    pub title: String,
    pub body: String,
}

/// The static monthly edition shipped with the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edition {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub editorial_note: EditorialNote,
    pub books: Vec<EditionBook>,
}

impl Edition {
    pub fn empty() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            editorial_note: EditorialNote {
                title: String::new(),
                body: String::new(),
            },
            books: Vec::new(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let mut edition: Edition =
            serde_json::from_str(raw).context("edition JSON is malformed")?;
        edition.books.truncate(MAX_EDITION_BOOKS);
        Ok(edition)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read edition at {}", path.display()))?;
        let edition = Self::from_json(&raw)?;
        info!("Edition loaded - books={}, id={}", edition.books.len(), edition.id);
        Ok(edition)
    }

    pub fn book(&self, id: &str) -> Option<&EditionBook> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Whether the edition's date window covers the given day, inclusive.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        let Ok(start) = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d") else {
            return false;
        };
        let Ok(end) = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d") else {
            return false;
        };
        date >= start && date <= end
    }
}

/// The AI-curated monthly listing, cached by month key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiEdition {
    pub theme: String,
    pub description: String,
    pub books: Vec<EditionBook>,
    pub month: String,
}

#[derive(Debug, Deserialize)]
struct CurationPayload {
    theme: String,
    description: String,
    books: Vec<EditionBook>,
}

/// "YYYY-MM" cache key for a timestamp.
pub fn month_key(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

fn month_name(now: DateTime<Utc>) -> String {
    let names = [
        "January", "February", "March", "April", "May", "June", "July",
        "August", "September", "October", "November", "December",
    ];
    format!("{} {}", names[now.month0() as usize], now.year())
}

/// Regenerates the monthly AI edition on demand and caches it until the
/// month key rolls over. Concurrent callers within the same month share the
/// cached value; the blob store carries it across restarts.
pub struct EditionCurator {
    backend: Arc<dyn GenerativeBackend>,
    catalog: Arc<Catalog>,
    classifier: Arc<dyn OriginClassifier>,
    store: Arc<dyn BlobStore>,
    cache: RwLock<Option<AiEdition>>,
}

impl EditionCurator {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        catalog: Arc<Catalog>,
        classifier: Arc<dyn OriginClassifier>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            backend,
            catalog,
            classifier,
            store,
            cache: RwLock::new(None),
        }
    }

    /// The edition for the current month, regenerating if the cached one is
    /// from an earlier month.
    pub async fn monthly_edition(
        &self,
        context: Option<&ReadingContext>,
    ) -> Result<AiEdition, ConciergeError> {
        self.edition_for(Utc::now(), context).await
    }

    pub async fn edition_for(
        &self,
        now: DateTime<Utc>,
        context: Option<&ReadingContext>,
    ) -> Result<AiEdition, ConciergeError> {
        let month = month_key(now);

        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.month == month {
                debug!("AI edition cache hit - month={}", month);
                return Ok(cached.clone());
            }
        }

        if let Some(raw) = self.store.get(AI_EDITION_STORE_KEY).await {
            if let Ok(stored) = serde_json::from_str::<AiEdition>(&raw) {
                if stored.month == month {
                    debug!("AI edition restored from store - month={}", month);
                    *self.cache.write().await = Some(stored.clone());
                    return Ok(stored);
                }
            }
        }

        let edition = self.curate(now, context).await?;

        if let Ok(raw) = serde_json::to_string(&edition) {
            if let Err(e) = self.store.set(AI_EDITION_STORE_KEY, raw).await {
                warn!("Failed to persist AI edition: {}", e);
            }
        }
        *self.cache.write().await = Some(edition.clone());
        Ok(edition)
    }

    async fn curate(
        &self,
        now: DateTime<Utc>,
        context: Option<&ReadingContext>,
    ) -> Result<AiEdition, ConciergeError> {
        if !self.backend.is_configured() {
            return Err(ConciergeError::BackendUnavailable(
                "curation service not configured".to_string(),
            ));
        }

        let prompt = self.curation_prompt(now, context);
        let text = self.backend.complete("", &prompt, 4000, 0.8).await?;
        let payload: CurationPayload = parse::parse_payload(&text)?;

        let mut books = payload.books;
        books.truncate(MAX_AI_EDITION_BOOKS);
        self.enforce_origin_floor(&mut books);

        info!(
            "AI edition curated - month={}, theme=\"{}\", books={}",
            month_key(now),
            payload.theme,
            books.len()
        );

        Ok(AiEdition {
            theme: payload.theme,
            description: payload.description,
            books,
            month: month_key(now),
        })
    }

    /// Post-hoc floor on target-origin representation. When the backend's
    /// selection falls under the floor, matching catalog books are swapped in
    /// for the tail of the non-matching selection.
    fn enforce_origin_floor(&self, books: &mut Vec<EditionBook>) {
        if books.is_empty() {
            return;
        }
        let matching: Vec<EditionBook> = books
            .iter()
            .filter(|b| self.classifier.is_target_origin(&b.author))
            .cloned()
            .collect();
        let share = matching.len() as f32 / books.len() as f32;
        if share >= ORIGIN_FLOOR {
            return;
        }

        let target = (books.len() as f32 * ORIGIN_FLOOR).ceil() as usize;
        let needed = target - matching.len();
        warn!(
            "AI edition under origin floor ({}/{}), swapping in {} catalog books",
            matching.len(),
            books.len(),
            needed
        );

        let selected: Vec<String> = books.iter().map(|b| b.id.clone()).collect();
        let additions: Vec<EditionBook> = self
            .catalog
            .books()
            .iter()
            .filter(|b| {
                self.classifier.is_target_origin(&b.author) && !selected.contains(&b.id)
            })
            .take(needed)
            .map(|b| catalog_book_as_edition(b))
            .collect();

        if additions.is_empty() {
            return;
        }

        let total = books.len();
        let others: Vec<EditionBook> = books
            .iter()
            .filter(|b| !self.classifier.is_target_origin(&b.author))
            .cloned()
            .collect();

        let mut rebuilt = matching;
        rebuilt.extend(additions);
        let keep_others = total.saturating_sub(rebuilt.len());
        rebuilt.extend(others.into_iter().take(keep_others));
        rebuilt.truncate(total);
        *books = rebuilt;
    }

    fn curation_prompt(&self, now: DateTime<Utc>, context: Option<&ReadingContext>) -> String {
        // Balanced sample offered to the backend: up to 50 from each partition.
        let mut matching = Vec::new();
        let mut others = Vec::new();
        for book in self.catalog.books() {
            if book.title.is_empty() || book.author.is_empty() {
                continue;
            }
            if self.classifier.is_target_origin(&book.author) {
                if matching.len() < 50 {
                    matching.push(book);
                }
            } else if others.len() < 50 {
                others.push(book);
            }
        }

        let listing: String = matching
            .iter()
            .chain(others.iter())
            .map(|b| {
                format!(
                    "- {} | {} by {} | {} | {}\n",
                    b.id,
                    b.title,
                    b.author,
                    b.genres.iter().take(2).cloned().collect::<Vec<_>>().join(", "),
                    b.moods.iter().take(2).cloned().collect::<Vec<_>>().join(", "),
                )
            })
            .collect();

        let context_block = match context {
            Some(ctx) => format!(
                "Current Context:\n- Month: {}\n- Season: {}\n- Time of Day: {}\n{}{}- Reading Mood: {}\n",
                month_name(now),
                ctx.season,
                ctx.time_of_day,
                ctx.weather
                    .as_ref()
                    .map(|w| format!("- Weather: {}, {}C\n", w.condition, w.temp))
                    .unwrap_or_default(),
                ctx.location
                    .as_ref()
                    .map(|l| format!("- Location: {l}\n"))
                    .unwrap_or_default(),
                ctx.reading_mood,
            ),
            None => format!("Current Context:\n- Month: {}\n", month_name(now)),
        };

        format!(
            r#"You are curating this month's reading edition for a mindful reading room focused on physical books and slow, intentional reading.

{context_block}
BALANCED CURATION:
- Aim for roughly half the selection from Indian authors (acceptable range 40-60%)
- Balance classic Indian literature with contemporary voices
- The remaining books should be diverse international authors

Context-driven curation: choose genres that naturally fit the season and weather above, and let the reading mood guide what readers need right now.

Your task:
1. Create a cohesive THEME that responds to the current season and time of year
2. Write a brief (2-3 sentence) DESCRIPTION explaining how this edition fits the moment
3. Select EXACTLY {max_books} books from the list below that match BOTH the theme AND the seasonal context
4. For each book write:
   - why_this_book: why this book fits THIS moment in time, literary and specific
   - best_context: when/where to read it (e.g. "rainy afternoons", "before sunrise")
   - estimated_sessions: a number between 3 and 8

Available books:
{listing}
Respond with ONLY valid JSON in this exact format (no markdown, no code blocks):
{{
  "theme": "Theme title (3-6 words)",
  "description": "Brief description of the edition (2-3 sentences)",
  "books": [
    {{
      "id": "book_id_from_catalog",
      "title": "book title",
      "author": "author name",
      "why_this_book": "Literary, specific reason this book fits the theme",
      "best_context": "when/where to read it",
      "estimated_sessions": 5,
      "genres": ["genre1", "genre2"]
    }}
  ]
}}"#,
            context_block = context_block,
            max_books = MAX_AI_EDITION_BOOKS,
            listing = listing,
        )
    }
}

/// Shapes a plain catalog entry into an edition book with templated
/// narrative fields, used when the floor swap pulls from the catalog.
fn catalog_book_as_edition(book: &BookRecord) -> EditionBook {
    let genre = book
        .genres
        .first()
        .cloned()
        .unwrap_or_else(|| "literary".to_string());
    EditionBook {
        id: book.id.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        why_this_book: format!(
            "A thoughtful {} work that fits the contemplative mood of the season.",
            genre.replace('-', " ")
        ),
        best_context: "quiet reading moments".to_string(),
        estimated_sessions: 5,
        genres: book.genres.iter().take(2).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_edition_caps_books() {
        let books: Vec<String> = (0..10)
            .map(|i| {
                format!(
                    r#"{{"id":"b{i}","title":"T","author":"A","why_this_book":"w","best_context":"c","estimated_sessions":3}}"#
                )
            })
            .collect();
        let raw = format!(
            r#"{{"id":"ed","title":"Edition","start_date":"2026-02-01","end_date":"2026-02-28",
               "editorial_note":{{"title":"n","body":"b"}},"books":[{}]}}"#,
            books.join(",")
        );
        let edition = Edition::from_json(&raw).unwrap();
        assert_eq!(edition.books.len(), MAX_EDITION_BOOKS);
    }

    #[test]
    fn edition_active_within_window() {
        let raw = r#"{"id":"ed","title":"Edition","start_date":"2026-02-01","end_date":"2026-02-28",
                      "editorial_note":{"title":"n","body":"b"},"books":[]}"#;
        let edition = Edition::from_json(raw).unwrap();
        assert!(edition.is_active(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()));
        assert!(!edition.is_active(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()));
    }

    #[test]
    fn month_key_format() {
        let now = DateTime::parse_from_rfc3339("2026-02-03T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(month_key(now), "2026-02");
    }
}
