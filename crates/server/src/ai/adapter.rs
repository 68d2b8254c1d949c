//! Seams between the dispatcher and the hosted APIs

use async_trait::async_trait;
use healthbuddy_core::{AdapterError, Snippet};

/// A hosted chat-completion model
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// One round-trip: optional system prompt plus a single user message.
    async fn complete(&self, system: Option<&str>, user_message: &str)
    -> Result<String, AdapterError>;
}

/// A hosted web-search service
#[async_trait]
pub trait SearchAdapter: Send + Sync {
    /// Search and return a short ordered list of normalized hits.
    async fn search(&self, query: &str) -> Result<Vec<Snippet>, AdapterError>;
}
