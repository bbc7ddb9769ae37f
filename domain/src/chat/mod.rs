//! Chat domain.
//!
//! - [`conversation::Conversation`] — a titled thread owned by one user
//! - [`message::Message`] — a single immutable entry within a conversation
//! - [`identity::Identity`] — the authenticated user a session acts for

pub mod conversation;
pub mod identity;
pub mod message;
