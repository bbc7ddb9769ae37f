//! reqwest-based [`AssistantBackend`]

use super::protocol::{CHAT_PATH, ChatRequest, ReplyBody, SEARCH_PATH, SearchRequest};
use async_trait::async_trait;
use logangpt_application::ports::assistant_backend::{AssistantBackend, BackendError};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the assistant server.
///
/// Makes exactly one attempt per call. Connection failures, non-2xx
/// statuses and bodies without a `reply` field all surface as
/// [`BackendError::Unreachable`].
#[derive(Debug, Clone)]
pub struct HttpAssistantBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssistantBackend {
    /// Create a backend rooted at `base_url` (e.g. `http://127.0.0.1:5000`).
    ///
    /// Without a timeout a request may wait indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    async fn send(&self, text: &str, is_search_query: bool) -> Result<String, BackendError> {
        let request = if is_search_query {
            self.client
                .post(self.endpoint(SEARCH_PATH))
                .json(&SearchRequest { query: text })
        } else {
            self.client
                .post(self.endpoint(CHAT_PATH))
                .json(&ChatRequest { message: text })
        };

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Unreachable(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: ReplyBody = response
            .json()
            .await
            .map_err(|e| BackendError::Unreachable(format!("Invalid response body: {}", e)))?;

        debug!("Backend replied with {} chars", body.reply.chars().count());
        Ok(body.reply)
    }
}
