//! Assistant backend adapter
//!
//! Talks to the LoganGPT HTTP server: `POST /api/chat` for conversation
//! turns and `POST /api/search` for web search queries.

pub mod http;
pub mod protocol;

pub use http::HttpAssistantBackend;
