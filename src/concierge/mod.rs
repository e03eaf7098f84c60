//! Concierge Pipeline
//!
//! Turns a free-text mood/need statement into a small ranked set of book
//! suggestions. Control flow: derive tags and signals, assemble a candidate
//! pool, route between catalog and discovery, ask the backend, then
//! reconcile its output into a response that honors the safety and
//! representation invariants. Every backend or parse failure lands in a
//! deterministic fallback; only request validation errors leave this module.

pub mod candidates;
pub mod parse;
pub mod prompt;
pub mod reconcile;
pub mod representation;
pub mod signals;
pub mod tags;

pub use candidates::SelectionMode;
pub use representation::{IndianAuthors, OriginClassifier, OriginRequirement};
pub use tags::derive_tags;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::GenerativeBackend;
use crate::catalog::{Catalog, Edition};
use crate::context::ReadingContext;
use crate::error::ConciergeError;
use crate::safety::AudienceFilter;

/// The externally visible recommendation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// A full concierge response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConciergeReply {
    pub title: String,
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_mode: Option<bool>,
}

/// One stateless recommendation request.
#[derive(Debug, Clone, Default)]
pub struct ConciergeRequest {
    pub message: String,
    pub exclude_book_ids: Vec<String>,
    pub context: Option<ReadingContext>,
}

/// Result of a book-summary lookup.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub author: String,
    pub summary: String,
}

/// The recommendation pipeline. Holds only shared read-only state; every
/// request derives its own tags, pool, and suggestions.
pub struct ConciergeEngine {
    catalog: Arc<Catalog>,
    edition: Arc<Edition>,
    backend: Arc<dyn GenerativeBackend>,
    classifier: Arc<dyn OriginClassifier>,
    mode: SelectionMode,
}

impl ConciergeEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        edition: Arc<Edition>,
        backend: Arc<dyn GenerativeBackend>,
    ) -> Self {
        Self {
            catalog,
            edition,
            backend,
            classifier: Arc::new(IndianAuthors::new()),
            mode: SelectionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn OriginClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Handles one recommendation request end to end.
    pub async fn recommend(
        &self,
        request: &ConciergeRequest,
    ) -> Result<ConciergeReply, ConciergeError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ConciergeError::InvalidRequest("Message required.".to_string()));
        }

        let request_id = Uuid::new_v4();
        let signals = signals::extract_signals(message);
        info!(
            "Concierge request {} - children={}, origin={:?}, exclusions={}",
            request_id,
            signals.childrens_request,
            signals.origin,
            request.exclude_book_ids.len()
        );

        // Discovery path: specialized queries skip the catalog and ask the
        // backend to recommend from its own knowledge. Any failure falls
        // through to the catalog pipeline.
        if signals.use_discovery(message) && self.backend.is_configured() {
            match self.discover(message, &signals).await {
                Ok(reply) if !reply.suggestions.is_empty() => return Ok(reply),
                Ok(_) => debug!("Discovery returned no usable books, using catalog path"),
                Err(e) => warn!("Discovery failed ({}), using catalog path", e),
            }
        }

        self.recommend_from_catalog(message, request, &signals).await
    }

    async fn discover(
        &self,
        message: &str,
        signals: &signals::RequestSignals,
    ) -> Result<ConciergeReply, ConciergeError> {
        let constraints = prompt::PromptConstraints {
            child_safety: signals.childrens_request,
            age_hint: signals.requested_age,
            origin: signals.origin,
            exclusions: 0,
        };
        let built = prompt::discovery_prompt(message, &constraints);
        let text = self
            .backend
            .complete(&built.system, &built.user, built.max_tokens, built.temperature)
            .await?;
        let payload: parse::DiscoveryPayload = parse::parse_payload(&text)?;

        let suggestions = reconcile::discovery_suggestions(
            payload.books,
            signals.origin,
            self.classifier.as_ref(),
        );
        Ok(ConciergeReply {
            title: payload
                .title
                .unwrap_or_else(|| "Handpicked for you".to_string()),
            suggestions,
            discovery_mode: Some(true),
        })
    }

    async fn recommend_from_catalog(
        &self,
        message: &str,
        request: &ConciergeRequest,
        signals: &signals::RequestSignals,
    ) -> Result<ConciergeReply, ConciergeError> {
        let audience = signals
            .childrens_request
            .then(|| AudienceFilter::new(signals.requested_age));

        let mut pool =
            candidates::build_candidates(message, self.mode, &self.catalog, &self.edition);
        candidates::apply_exclusions(&mut pool, &request.exclude_book_ids);
        if let Some(ref filter) = audience {
            filter.retain_safe(&mut pool);
        }

        // Catalog expansion during balancing must not reintroduce entries the
        // shaping above removed.
        let exclude = &request.exclude_book_ids;
        let eligible = |book: &crate::catalog::BookRecord| {
            !exclude.iter().any(|id| id == &book.id)
                && audience
                    .as_ref()
                    .map(|f| f.check_book(book).is_safe)
                    .unwrap_or(true)
        };
        let pool = representation::balance_pool(
            pool,
            signals.origin,
            &self.catalog,
            self.classifier.as_ref(),
            &eligible,
        );

        if pool.is_empty() {
            warn!("Candidate pool is empty, serving fallback");
            return Ok(reconcile::fallback_response(message, &self.edition));
        }

        if !self.backend.is_configured() {
            debug!("Backend not configured, serving fallback");
            return Ok(reconcile::fallback_response(message, &self.edition));
        }

        let constraints = prompt::PromptConstraints {
            child_safety: signals.childrens_request,
            age_hint: signals.requested_age,
            origin: signals.origin,
            exclusions: request.exclude_book_ids.len(),
        };
        let built = prompt::catalog_prompt(message, &pool, request.context.as_ref(), &constraints);

        let text = match self
            .backend
            .complete(&built.system, &built.user, built.max_tokens, built.temperature)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Backend unavailable ({}), serving fallback", e);
                return Ok(reconcile::fallback_response(message, &self.edition));
            }
        };

        let payload: parse::SuggestionPayload = match parse::parse_payload(&text) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Backend output unusable ({}), serving fallback", e);
                return Ok(reconcile::fallback_response(message, &self.edition));
            }
        };

        let mapped = reconcile::map_suggestions(&pool, &payload.suggestions);
        let enforced = reconcile::enforce_representation(
            mapped,
            &pool,
            signals.origin,
            self.classifier.as_ref(),
        );

        info!(
            "Concierge reply - candidates={}, suggestions={}",
            pool.len(),
            enforced.len()
        );

        Ok(ConciergeReply {
            title: payload
                .title
                .unwrap_or_else(|| "A few quiet suggestions".to_string()),
            suggestions: enforced,
            discovery_mode: None,
        })
    }

    /// Evocative one-paragraph summary for a title. The one operation with no
    /// fallback path: backend failures surface to the caller.
    pub async fn summarize(
        &self,
        title: &str,
        author: &str,
    ) -> Result<BookSummary, ConciergeError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ConciergeError::InvalidRequest("Title required.".to_string()));
        }
        if !self.backend.is_configured() {
            return Err(ConciergeError::BackendUnavailable(
                "summary service not configured".to_string(),
            ));
        }

        let built = prompt::summary_prompt(title, author.trim());
        let text = self
            .backend
            .complete(&built.system, &built.user, built.max_tokens, built.temperature)
            .await?;

        // Best effort: a clean payload if the backend returned one, otherwise
        // the raw text stands in as the summary.
        let (parsed_author, summary) = match parse::parse_payload::<parse::SummaryPayload>(&text) {
            Ok(payload) => (payload.author, payload.summary),
            Err(_) => (None, Some(text.trim().to_string())),
        };

        let summary = summary.unwrap_or_default();
        if summary.is_empty() {
            return Err(ConciergeError::UnparsableOutput(
                "summary text was empty".to_string(),
            ));
        }

        Ok(BookSummary {
            author: parsed_author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| author.trim().to_string()),
            summary,
        })
    }
}
