//! Chat Store port
//!
//! Hosted document database holding conversations and their messages, with
//! live query subscriptions.

use super::subscription::Subscription;
use async_trait::async_trait;
use logangpt_domain::{Conversation, ConversationId, Message, NewMessage, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Callback receiving a full query snapshot.
pub type SnapshotSink<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

/// Errors that can occur during chat store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Chat store unavailable: {0}")]
    Unavailable(String),
}

/// Document store for conversations.
///
/// Writes stamp `created_at` on the store side. Subscriptions deliver the
/// current snapshot immediately and then a fresh snapshot after every change.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_conversation(
        &self,
        owner: &UserId,
        title: &str,
    ) -> Result<Conversation, StoreError>;

    async fn update_title(&self, id: &ConversationId, title: &str) -> Result<(), StoreError>;

    async fn append_message(
        &self,
        id: &ConversationId,
        message: NewMessage,
    ) -> Result<Message, StoreError>;

    /// Number of messages currently stored in the conversation.
    async fn message_count(&self, id: &ConversationId) -> Result<usize, StoreError>;

    /// Live list of `owner`'s conversations, newest first.
    async fn subscribe_conversations(
        &self,
        owner: &UserId,
        sink: SnapshotSink<Conversation>,
    ) -> Result<Subscription, StoreError>;

    /// Live message list of one conversation, oldest first.
    async fn subscribe_messages(
        &self,
        id: &ConversationId,
        sink: SnapshotSink<Message>,
    ) -> Result<Subscription, StoreError>;
}
