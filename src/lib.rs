//! Reserve Concierge
//!
//! A book-recommendation service for a mindful reading room:
//! - Keyword tag derivation over a read-only catalog
//! - Candidate pool assembly with curated-edition blending
//! - Audience safety and representation balancing
//! - Generative backend with strict-then-repair output parsing
//! - Deterministic fallbacks whenever the backend lets us down

pub mod backend;
pub mod catalog;
pub mod concierge;
pub mod context;
pub mod error;
pub mod safety;
pub mod server;
pub mod store;

// Re-exports for convenience
pub use catalog::{Catalog, Edition};
pub use concierge::{ConciergeEngine, ConciergeReply, ConciergeRequest, Suggestion};
pub use error::ConciergeError;
