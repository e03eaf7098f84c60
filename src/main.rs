//! Reserve Concierge service binary.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use reserve_concierge::backend::{AnthropicBackend, GenerativeBackend};
use reserve_concierge::catalog::{Catalog, Edition, EditionCurator};
use reserve_concierge::concierge::{ConciergeEngine, IndianAuthors, SelectionMode};
use reserve_concierge::context::WeatherClient;
use reserve_concierge::server::{run_server, AppState};
use reserve_concierge::store::JsonFileStore;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("\n{}", "═".repeat(60));
    println!("📚 Reserve Concierge v0.2.0");
    println!("{}\n", "═".repeat(60));

    // Read-only corpus, loaded once for the process lifetime.
    let catalog_path = env_or("CATALOG_PATH", "data/books.json");
    let catalog = Arc::new(match Catalog::load(&catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Starting with an empty catalog: {}", e);
            Catalog::empty()
        }
    });

    let edition_path = env_or("EDITION_PATH", "data/edition.json");
    let edition = Arc::new(match Edition::load(&edition_path) {
        Ok(edition) => edition,
        Err(e) => {
            warn!("Starting with an empty edition: {}", e);
            Edition::empty()
        }
    });

    let backend = Arc::new(AnthropicBackend::from_env());
    if !backend.is_configured() {
        warn!("ANTHROPIC_API_KEY not set; serving deterministic fallbacks only");
    }

    let classifier = Arc::new(IndianAuthors::new());
    let mode = SelectionMode::from_setting(&env_or("CONCIERGE_MODE", "blend"));
    info!("Selection mode: {:?}", mode);

    let engine = Arc::new(
        ConciergeEngine::new(catalog.clone(), edition.clone(), backend.clone())
            .with_mode(mode)
            .with_classifier(classifier.clone()),
    );

    let store = Arc::new(JsonFileStore::open(env_or("STORE_PATH", "state.json"))?);
    let curator = Arc::new(EditionCurator::new(
        backend.clone(),
        catalog.clone(),
        classifier,
        store,
    ));

    let state = AppState {
        engine,
        curator,
        weather: Arc::new(WeatherClient::from_env()),
    };

    let addr = env_or("CONCIERGE_ADDR", "127.0.0.1:8787");
    println!("🛋️  Catalog: {} books | Edition: {} books", catalog.len(), edition.books.len());
    println!("🌐 Serving on http://{}\n", addr);

    run_server(state, &addr).await
}
