//! Conversation entity

use super::identity::UserId;
use crate::util::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a conversation document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversation owned by one user (Entity)
///
/// The title starts as [`Conversation::DEFAULT_TITLE`] and is renamed once,
/// from the first user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub const DEFAULT_TITLE: &'static str = "New Chat";

    /// Maximum title length, in characters
    pub const TITLE_MAX_CHARS: usize = 30;

    /// Derive a title from the first message of a conversation.
    pub fn title_from_first_message(text: &str) -> String {
        truncate_chars(text, Self::TITLE_MAX_CHARS).to_string()
    }

    pub fn has_default_title(&self) -> bool {
        self.title == Self::DEFAULT_TITLE
    }
}
