//! In-process document store with live queries

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use logangpt_application::ports::chat_store::{ChatStore, SnapshotSink, StoreError};
use logangpt_application::ports::subscription::Subscription;
use logangpt_domain::{Conversation, ConversationId, Message, NewMessage, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// A registered snapshot sink and the query key it watches.
struct Listener<K, T> {
    key: K,
    token: CancellationToken,
    sink: SnapshotSink<T>,
}

impl<K: PartialEq, T> Listener<K, T> {
    fn watches(&self, key: &K) -> bool {
        &self.key == key && !self.token.is_cancelled()
    }
}

/// On-disk shape of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    conversations: Vec<Conversation>,
    messages: BTreeMap<String, Vec<Message>>,
}

#[derive(Default)]
struct StoreState {
    document: StoreDocument,
    conversation_listeners: Vec<Listener<UserId, Conversation>>,
    message_listeners: Vec<Listener<ConversationId, Message>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Server-side timestamp, strictly increasing across all writes.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn conversations_of(&self, owner: &UserId) -> Vec<Conversation> {
        let mut list: Vec<Conversation> = self
            .document
            .conversations
            .iter()
            .filter(|c| &c.owner_id == owner)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    fn messages_of(&self, id: &ConversationId) -> Vec<Message> {
        self.document
            .messages
            .get(id.as_str())
            .cloned()
            .unwrap_or_default()
    }

    fn contains(&self, id: &ConversationId) -> bool {
        self.document.conversations.iter().any(|c| &c.id == id)
    }

    /// Undo the newest append of `id`, forgetting the list once it is empty.
    fn drop_last_message(&mut self, id: &ConversationId) {
        if let Some(list) = self.document.messages.get_mut(id.as_str()) {
            list.pop();
            if list.is_empty() {
                self.document.messages.remove(id.as_str());
            }
        }
    }

    fn prune(&mut self) {
        self.conversation_listeners
            .retain(|l| !l.token.is_cancelled());
        self.message_listeners.retain(|l| !l.token.is_cancelled());
    }

    /// Snapshot and live sinks of `owner`'s conversation query.
    fn conversation_delivery(&self, owner: &UserId) -> Delivery<Conversation> {
        let sinks = self
            .conversation_listeners
            .iter()
            .filter(|l| l.watches(owner))
            .map(|l| l.sink.clone())
            .collect();
        Delivery {
            snapshot: self.conversations_of(owner),
            sinks,
        }
    }

    fn message_delivery(&self, id: &ConversationId) -> Delivery<Message> {
        let sinks = self
            .message_listeners
            .iter()
            .filter(|l| l.watches(id))
            .map(|l| l.sink.clone())
            .collect();
        Delivery {
            snapshot: self.messages_of(id),
            sinks,
        }
    }
}

/// Snapshot to hand to sinks once the state lock is released.
struct Delivery<T> {
    snapshot: Vec<T>,
    sinks: Vec<SnapshotSink<T>>,
}

impl<T: Clone> Delivery<T> {
    fn deliver(self) {
        for sink in self.sinks {
            sink(self.snapshot.clone());
        }
    }
}

/// Document store held in memory, optionally written through to a file.
///
/// A write that cannot reach the file is rolled back in memory too, so a
/// failed call leaves no trace in later snapshots or counts.
///
/// Conversation queries are ordered by `created_at` descending, message
/// queries ascending. Timestamps are assigned here, never by the caller.
#[derive(Default)]
pub struct InMemoryChatStore {
    state: Mutex<StoreState>,
    path: Option<PathBuf>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON file, creating it on first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::Unavailable(format!("Corrupt store file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "Cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let last_stamp = document
            .conversations
            .iter()
            .map(|c| c.created_at)
            .chain(document.messages.values().flatten().map(|m| m.created_at))
            .max();

        debug!(
            "Opened chat store {} ({} conversations)",
            path.display(),
            document.conversations.len()
        );

        Ok(Self {
            state: Mutex::new(StoreState {
                document,
                last_stamp,
                ..StoreState::default()
            }),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&state.document)
            .map_err(|e| StoreError::Unavailable(format!("Cannot encode store: {}", e)))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Unavailable(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(path, content).await.map_err(|e| {
            warn!("Failed to write chat store {}: {}", path.display(), e);
            StoreError::Unavailable(format!("Cannot write {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_conversation(
        &self,
        owner: &UserId,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let (conversation, delivery) = {
            let mut state = self.state.lock().await;
            let conversation = Conversation {
                id: ConversationId::new(Uuid::new_v4().to_string()),
                owner_id: owner.clone(),
                title: title.to_string(),
                created_at: state.stamp(),
            };
            state.document.conversations.push(conversation.clone());
            if let Err(e) = self.persist(&state).await {
                state.document.conversations.pop();
                return Err(e);
            }
            (conversation, state.conversation_delivery(owner))
        };
        debug!("Stored conversation {}", conversation.id);
        delivery.deliver();
        Ok(conversation)
    }

    async fn update_title(&self, id: &ConversationId, title: &str) -> Result<(), StoreError> {
        let delivery = {
            let mut state = self.state.lock().await;
            let conversation = state
                .document
                .conversations
                .iter_mut()
                .find(|c| &c.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let previous = std::mem::replace(&mut conversation.title, title.to_string());
            let owner = conversation.owner_id.clone();
            if let Err(e) = self.persist(&state).await {
                if let Some(conversation) =
                    state.document.conversations.iter_mut().find(|c| &c.id == id)
                {
                    conversation.title = previous;
                }
                return Err(e);
            }
            state.conversation_delivery(&owner)
        };
        delivery.deliver();
        Ok(())
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: NewMessage,
    ) -> Result<Message, StoreError> {
        let (stored, delivery) = {
            let mut state = self.state.lock().await;
            if !state.contains(id) {
                return Err(StoreError::NotFound(id.clone()));
            }
            let stored = message.stamped(state.stamp());
            state
                .document
                .messages
                .entry(id.as_str().to_string())
                .or_default()
                .push(stored.clone());
            if let Err(e) = self.persist(&state).await {
                state.drop_last_message(id);
                return Err(e);
            }
            (stored, state.message_delivery(id))
        };
        delivery.deliver();
        Ok(stored)
    }

    async fn message_count(&self, id: &ConversationId) -> Result<usize, StoreError> {
        let state = self.state.lock().await;
        if !state.contains(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(state.document.messages.get(id.as_str()).map_or(0, Vec::len))
    }

    async fn subscribe_conversations(
        &self,
        owner: &UserId,
        sink: SnapshotSink<Conversation>,
    ) -> Result<Subscription, StoreError> {
        let token = CancellationToken::new();
        let snapshot = {
            let mut state = self.state.lock().await;
            state.prune();
            state.conversation_listeners.push(Listener {
                key: owner.clone(),
                token: token.clone(),
                sink: sink.clone(),
            });
            state.conversations_of(owner)
        };
        sink(snapshot);
        Ok(Subscription::new(token))
    }

    async fn subscribe_messages(
        &self,
        id: &ConversationId,
        sink: SnapshotSink<Message>,
    ) -> Result<Subscription, StoreError> {
        let token = CancellationToken::new();
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.contains(id) {
                return Err(StoreError::NotFound(id.clone()));
            }
            state.prune();
            state.message_listeners.push(Listener {
                key: id.clone(),
                token: token.clone(),
                sink: sink.clone(),
            });
            state.messages_of(id)
        };
        sink(snapshot);
        Ok(Subscription::new(token))
    }
}
