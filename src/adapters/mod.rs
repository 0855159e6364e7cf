//! Model capability interface for the pipeline's external stages.
//!
//! The three model stages (tokenize, embed, classify) call out through
//! the [`ModelBackend`] trait; the orchestrator never sees a concrete
//! model runtime. Failures propagate as errors and are retried by the
//! orchestrator's retry policy.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the HTTP backend
pub use http::HttpModelBackend;

use crate::domain::{Classification, Embedding, TokenSequence};

/// Trait for model-serving backends
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Tokenize a text into vocabulary ids
    async fn tokenize(&self, text: &str) -> Result<TokenSequence>;

    /// Produce a dense embedding for a token sequence
    async fn embed(&self, tokens: &TokenSequence) -> Result<Embedding>;

    /// Classify the sentiment of a raw text
    async fn classify(&self, text: &str) -> Result<Classification>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;
}
