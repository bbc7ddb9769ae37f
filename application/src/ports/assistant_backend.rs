//! Assistant Backend port
//!
//! Defines the interface for the stateless chat/search HTTP backend.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the assistant backend.
///
/// Transport failures, non-2xx statuses and undecodable bodies are all the
/// same thing to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),
}

/// Stateless request/response assistant.
///
/// One attempt per call; implementations must not retry.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Send `text` and return the reply text.
    ///
    /// `is_search_query` selects the web search endpoint instead of chat.
    async fn send(&self, text: &str, is_search_query: bool) -> Result<String, BackendError>;
}
