//! Message entities

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First bot message of a local-only conversation.
pub const GREETING: &str = "Hello! I am LoganGPT. Type / to search online.";

/// Bot message inserted when the assistant backend cannot be reached.
pub const FALLBACK_REPLY: &str = "Error: Could not reach LoganGPT server.";

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl std::str::FromStr for Sender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(DomainError::InvalidSender(other.to_string())),
        }
    }
}

/// The write-side shape of a message.
///
/// Carries everything except the creation time, which is stamped by
/// whoever persists it (the chat store, or the controller in local-only mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub text: String,
    pub sender: Sender,
    pub is_web_result: bool,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_web_result: false,
        }
    }

    /// A bot reply; `is_web_result` marks answers that came from web search.
    pub fn bot(text: impl Into<String>, is_web_result: bool) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_web_result,
        }
    }

    /// The literal reply used when the backend call failed.
    pub fn fallback() -> Self {
        Self::bot(FALLBACK_REPLY, false)
    }

    /// Stamp the message, producing the immutable entity.
    pub fn stamped(self, created_at: DateTime<Utc>) -> Message {
        Message {
            text: self.text,
            sender: self.sender,
            is_web_result: self.is_web_result,
            created_at,
        }
    }
}

/// A message in a conversation (Entity)
///
/// Immutable once created. Conversations order their messages by
/// `created_at` ascending and only ever append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub is_web_result: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}
