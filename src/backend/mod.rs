//! Generative Backend
//!
//! Opaque `complete(system, user) -> text` collaborator. The backend's output
//! is untyped and untrusted; parsing and repair happen in the concierge
//! pipeline, never here.

mod anthropic;

pub use anthropic::AnthropicBackend;

use async_trait::async_trait;

use crate::error::ConciergeError;

/// A single-shot text-completion service.
///
/// One attempt per request: missing credential, network failure, and
/// non-success responses are all reported as
/// [`ConciergeError::BackendUnavailable`] and never retried here. The caller
/// owns the fallback.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ConciergeError>;

    /// Whether a credential is present. When false the pipeline skips the
    /// backend entirely and serves the deterministic fallback.
    fn is_configured(&self) -> bool {
        true
    }
}
