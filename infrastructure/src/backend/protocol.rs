//! Wire types of the assistant HTTP API
//!
//! Both endpoints take a JSON object with a single string field and answer
//! with `{"reply": "..."}`. Extra response fields are ignored.

use serde::{Deserialize, Serialize};

/// Path of the chat endpoint, relative to the base URL
pub const CHAT_PATH: &str = "/api/chat";

/// Path of the web search endpoint, relative to the base URL
pub const SEARCH_PATH: &str = "/api/search";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReplyBody {
    pub reply: String,
}
