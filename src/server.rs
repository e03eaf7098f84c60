//! HTTP Service
//!
//! Thin axum layer over the concierge pipeline. Handlers validate shape,
//! delegate, and map the failure taxonomy onto status codes; everything
//! recoverable was already recovered further down.

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::{AiEdition, EditionCurator};
use crate::concierge::{BookSummary, ConciergeEngine, ConciergeReply, ConciergeRequest};
use crate::context::{reading_context, ReadingContext, WeatherClient};
use crate::error::ConciergeError;

/// Shared service state. Everything inside is read-only or internally
/// synchronized; requests never contend.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConciergeEngine>,
    pub curator: Arc<EditionCurator>,
    pub weather: Arc<WeatherClient>,
}

/// Error envelope for the API boundary.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ConciergeError> for ApiError {
    fn from(err: ConciergeError) -> Self {
        let status = match err {
            ConciergeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ConciergeError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ConciergeError::UnparsableOutput(_) => StatusCode::BAD_GATEWAY,
            ConciergeError::NoCandidates => StatusCode::NOT_FOUND,
        };
        let message = match &err {
            ConciergeError::InvalidRequest(msg) => msg.clone(),
            ConciergeError::BackendUnavailable(_) | ConciergeError::UnparsableOutput(_) => {
                "Concierge unavailable.".to_string()
            }
            ConciergeError::NoCandidates => "No suggestions available.".to_string(),
        };
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConciergeBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    exclude_book_ids: Vec<String>,
    #[serde(default)]
    context: Option<ReadingContext>,
}

async fn concierge_handler(
    State(state): State<AppState>,
    Json(body): Json<ConciergeBody>,
) -> Result<Json<ConciergeReply>, ApiError> {
    let request = ConciergeRequest {
        message: body.message,
        exclude_book_ids: body.exclude_book_ids,
        context: body.context,
    };
    let reply = state.engine.recommend(&request).await?;
    Ok(Json(reply))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditionBody {
    #[serde(default)]
    context: Option<ReadingContext>,
}

async fn edition_handler(
    State(state): State<AppState>,
    Json(body): Json<EditionBody>,
) -> Result<Json<AiEdition>, ApiError> {
    let edition = state
        .curator
        .monthly_edition(body.context.as_ref())
        .await
        .map_err(|e| match e {
            ConciergeError::BackendUnavailable(_) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "AI service not configured")
            }
            _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate edition"),
        })?;
    Ok(Json(edition))
}

#[derive(Deserialize)]
struct SummaryBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
}

#[derive(Serialize)]
struct SummaryReply {
    author: String,
    summary: String,
}

async fn summary_handler(
    State(state): State<AppState>,
    Json(body): Json<SummaryBody>,
) -> Result<Json<SummaryReply>, ApiError> {
    let BookSummary { author, summary } = state
        .engine
        .summarize(&body.title, &body.author)
        .await
        .map_err(|e| match e {
            ConciergeError::InvalidRequest(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "Title required.")
            }
            _ => ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Summary service unavailable."),
        })?;
    Ok(Json(SummaryReply { author, summary }))
}

#[derive(Deserialize)]
struct ContextQuery {
    location: Option<String>,
}

async fn context_handler(
    State(state): State<AppState>,
    Query(query): Query<ContextQuery>,
) -> Result<Json<ReadingContext>, ApiError> {
    let Some(location) = query.location.filter(|l| !l.trim().is_empty()) else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Location required"));
    };

    let weather = state.weather.fetch(&location).await;
    let context = reading_context(Some(location), weather, chrono::Utc::now());
    Ok(Json(context))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/concierge", post(concierge_handler))
        .route("/api/edition", post(edition_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/context", get(context_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until the listener fails.
pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Concierge listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
