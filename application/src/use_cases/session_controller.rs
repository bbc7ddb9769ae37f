//! Conversation Session Controller
//!
//! Owns every piece of UI-facing chat state and mediates between the
//! [`AuthProvider`], the [`ChatStore`] and the [`AssistantBackend`].
//! Emits [`UiEvent`] messages to a channel for the presentation layer.
//!
//! # Event model
//!
//! The controller runs on one logical thread. Collaborator callbacks never
//! touch its state directly: each one is turned into a [`SessionEvent`]
//! tagged with the [`SubscriptionId`] it was registered under and queued on
//! the controller's inbox. [`pump`](ConversationSessionController::pump)
//! drains the inbox; events whose id is no longer tracked are discarded, so a
//! snapshot that arrives after a conversation switch or a logout cannot leak
//! into the current view.
//!
//! # Feature flags
//!
//! [`SessionConfig`] selects persisted vs. local-only messages and popup vs.
//! redirect sign-in. Both variants share this one implementation.

use crate::config::SessionConfig;
use crate::ports::assistant_backend::AssistantBackend;
use crate::ports::auth_provider::{AuthError, AuthProvider, AuthSink};
use crate::ports::chat_store::{ChatStore, SnapshotSink, StoreError};
use crate::ports::speech_input::{SpeechError, SpeechEvent, SpeechInput, SpeechSink};
use crate::ports::subscription::Subscription;
use crate::ports::ui_event::UiEvent;
use chrono::Utc;
use logangpt_domain::util::truncate_chars;
use logangpt_domain::{
    AuthFlow, Conversation, ConversationId, GREETING, Identity, InputMode, InputState, Message,
    NewMessage, SessionState,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Errors returned by session operations.
///
/// An unreachable backend is not among them: it is recovered inside
/// [`send_message`](ConversationSessionController::send_message) by a
/// fallback bot message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    AuthFailure(#[from] AuthError),

    #[error("Speech input is not supported")]
    SpeechUnsupported,

    #[error("Unknown conversation: {0}")]
    UnknownConversation(ConversationId),

    #[error("Chat store error: {0}")]
    Store(#[from] StoreError),
}

/// Tag of one registered collaborator callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A collaborator callback, queued for the controller's thread.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    AuthChanged(Option<Identity>),
    Conversations {
        subscription: SubscriptionId,
        conversations: Vec<Conversation>,
    },
    Messages {
        subscription: SubscriptionId,
        messages: Vec<Message>,
    },
    Speech {
        subscription: SubscriptionId,
        event: SpeechEvent,
    },
}

/// A live subscription together with the id its events carry.
///
/// Replacing or dropping it cancels the underlying handle.
struct Tracked {
    id: SubscriptionId,
    _handle: Subscription,
}

impl Tracked {
    fn is(slot: &Option<Tracked>, id: SubscriptionId) -> bool {
        slot.as_ref().is_some_and(|tracked| tracked.id == id)
    }
}

/// Conversation session controller
///
/// Handles:
/// - Input mode transitions (normal, `/` command menu, web search)
/// - Sign-in/sign-out and the conversation list of the signed-in user
/// - Sending messages: optimistic echo, backend call, reply or fallback
/// - Voice input sessions
pub struct ConversationSessionController {
    backend: Arc<dyn AssistantBackend>,
    auth: Option<Arc<dyn AuthProvider>>,
    store: Option<Arc<dyn ChatStore>>,
    speech: Option<Arc<dyn SpeechInput>>,
    config: SessionConfig,

    identity: Option<Identity>,
    redirect_pending: bool,
    conversations: Vec<Conversation>,
    active_conversation: Option<ConversationId>,
    messages: Vec<Message>,
    input: InputState,
    side_menu_open: bool,
    listening: bool,
    last_state: SessionState,

    auth_subscription: Option<Subscription>,
    conversations_subscription: Option<Tracked>,
    messages_subscription: Option<Tracked>,
    speech_subscription: Option<Tracked>,
    next_subscription: u64,

    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ui_tx: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl ConversationSessionController {
    /// Create a controller around the assistant backend.
    ///
    /// Auth provider, chat store and speech input are attached with the
    /// `with_*` builders. A local-only session starts with the greeting.
    pub fn new(backend: Arc<dyn AssistantBackend>, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let messages = if config.persistence_enabled {
            Vec::new()
        } else {
            vec![NewMessage::bot(GREETING, false).stamped(Utc::now())]
        };

        Self {
            backend,
            auth: None,
            store: None,
            speech: None,
            config,
            identity: None,
            redirect_pending: false,
            conversations: Vec::new(),
            active_conversation: None,
            messages,
            input: InputState::new(),
            side_menu_open: false,
            listening: false,
            last_state: SessionState::Unauthenticated,
            auth_subscription: None,
            conversations_subscription: None,
            messages_subscription: None,
            speech_subscription: None,
            next_subscription: 0,
            events_tx,
            events_rx,
            ui_tx: None,
        }
    }

    pub fn with_auth_provider(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_chat_store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_speech_input(mut self, speech: Arc<dyn SpeechInput>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Set the channel UI events are emitted to.
    pub fn with_ui_events(mut self, tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        self.ui_tx = Some(tx);
        self
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        SessionState::derive(
            self.identity.is_some(),
            self.redirect_pending,
            self.active_conversation.is_some(),
        )
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Conversations of the signed-in user, newest first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_conversation_id(&self) -> Option<&ConversationId> {
        self.active_conversation.as_ref()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_conversation.as_ref()?;
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Displayed messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input_mode(&self) -> InputMode {
        self.input.mode()
    }

    pub fn input_text(&self) -> &str {
        self.input.text()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_side_menu_open(&self) -> bool {
        self.side_menu_open
    }

    /// Whether a message can be sent right now.
    pub fn can_send(&self) -> bool {
        !self.config.persistence_enabled || self.active_conversation.is_some()
    }

    // ==================== Lifecycle ====================

    /// Attach to the auth provider.
    ///
    /// In redirect flow the pending redirect result is collected first, before
    /// any state-change notification is relied on.
    pub async fn startup(&mut self) {
        let Some(auth) = self.auth.clone() else {
            debug!("No auth provider configured; session stays signed out");
            return;
        };

        if self.config.auth_flow == AuthFlow::Redirect {
            self.consume_redirect_result().await;
        }

        let tx = self.events_tx.clone();
        let sink: AuthSink = Arc::new(move |identity| {
            let _ = tx.send(SessionEvent::AuthChanged(identity));
        });
        self.auth_subscription = Some(auth.on_auth_state_change(sink));
        self.pump().await;
    }

    /// Collect the outcome of a redirect-style sign-in.
    ///
    /// The identity itself arrives through the auth listener.
    pub async fn consume_redirect_result(&mut self) {
        let Some(auth) = self.auth.clone() else {
            return;
        };
        match auth.consume_redirect_result().await {
            Ok(Some(identity)) => {
                debug!("Redirect sign-in returned {}", identity.display_name());
                self.redirect_pending = true;
            }
            Ok(None) => self.redirect_pending = false,
            Err(e) => {
                warn!("Redirect sign-in failed: {}", e);
                self.redirect_pending = false;
                self.alert(format!("Google Login Error: {}", e));
            }
        }
        self.refresh_state();
        self.pump().await;
    }

    /// Drain the inbox, applying every queued collaborator callback.
    ///
    /// Returns the number of events handled.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Apply one collaborator callback.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AuthChanged(identity) => self.apply_identity(identity).await,
            SessionEvent::Conversations {
                subscription,
                conversations,
            } => self.apply_conversations(subscription, conversations).await,
            SessionEvent::Messages {
                subscription,
                messages,
            } => self.apply_messages(subscription, messages),
            SessionEvent::Speech {
                subscription,
                event,
            } => self.apply_speech_event(subscription, event),
        }
    }

    // ==================== Input ====================

    /// The input buffer changed.
    pub fn on_input_changed(&mut self, text: impl Into<String>) {
        self.input.on_input_changed(text);
        self.emit_input();
    }

    /// Pick "Search Online" from the command menu.
    pub fn activate_search(&mut self) -> bool {
        let changed = self.input.activate_search();
        if changed {
            self.emit_input();
        }
        changed
    }

    pub fn cancel_search(&mut self) -> bool {
        let changed = self.input.cancel_search();
        if changed {
            self.emit_input();
        }
        changed
    }

    pub fn open_side_menu(&mut self) {
        self.set_side_menu(true);
    }

    pub fn close_side_menu(&mut self) {
        self.set_side_menu(false);
    }

    // ==================== Auth ====================

    /// Federated sign-in, popup or redirect style per configuration.
    pub async fn sign_in_with_google(&mut self) -> Result<(), SessionError> {
        let auth = self.auth_provider()?;
        let result = match self.config.auth_flow {
            AuthFlow::Popup => auth.sign_in_with_popup().await.map(|_| ()),
            AuthFlow::Redirect => {
                self.redirect_pending = true;
                self.refresh_state();
                let result = auth.sign_in_with_redirect().await;
                if result.is_err() {
                    self.redirect_pending = false;
                    self.refresh_state();
                }
                result
            }
        };
        self.finish_sign_in(result).await
    }

    pub async fn sign_in_with_email(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let auth = self.auth_provider()?;
        let result = auth.sign_in_with_email(email, password).await.map(|_| ());
        self.finish_sign_in(result).await
    }

    pub async fn register_with_email(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let auth = self.auth_provider()?;
        let result = auth
            .create_user_with_email(email, password)
            .await
            .map(|_| ());
        self.finish_sign_in(result).await
    }

    /// Sign out and drop everything that belonged to the identity.
    ///
    /// Live conversation and message subscriptions are cancelled, so no
    /// late snapshot can repopulate the signed-out view. When the provider
    /// refuses the sign-out the session is kept as it is.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(auth) = self.auth.clone()
            && let Err(e) = auth.sign_out().await
        {
            warn!("Sign-out failed: {}", e);
            self.alert(format!("Sign-out failed: {}", e));
            self.pump().await;
            return Err(SessionError::AuthFailure(e));
        }

        if self.identity.is_some() {
            info!("Signed out");
        }
        self.identity = None;
        self.redirect_pending = false;
        self.clear_chat_state();
        self.refresh_state();
        self.pump().await;
        Ok(())
    }

    // ==================== Conversations ====================

    /// Create a conversation for the signed-in user and make it active.
    pub async fn create_conversation(&mut self) -> Result<ConversationId, SessionError> {
        let owner = self
            .identity
            .as_ref()
            .map(|identity| identity.uid.clone())
            .ok_or(SessionError::NotAuthenticated)?;
        let store = self.chat_store()?;

        let conversation = store
            .create_conversation(&owner, Conversation::DEFAULT_TITLE)
            .await?;
        info!("Created conversation {}", conversation.id);

        self.activate(conversation.id.clone()).await?;
        self.set_side_menu(false);
        self.pump().await;
        Ok(conversation.id)
    }

    /// Make one of the user's conversations active.
    pub async fn select_conversation(&mut self, id: &ConversationId) -> Result<(), SessionError> {
        if self.identity.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        if !self.conversations.iter().any(|c| &c.id == id) {
            return Err(SessionError::UnknownConversation(id.clone()));
        }

        if self.active_conversation.as_ref() != Some(id) {
            self.activate(id.clone()).await?;
        }
        self.set_side_menu(false);
        self.pump().await;
        Ok(())
    }

    // ==================== Messages ====================

    /// Send the current input buffer.
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let text = self.input.text().to_string();
        self.send_message(&text).await
    }

    /// Send one message and append the assistant's answer.
    ///
    /// No-op for blank text, or when persistence is on and no conversation
    /// is active. The text and the search flag are captured before the input
    /// is cleared and search mode is cancelled. The user message is appended
    /// (and visible) before the backend is called. A backend failure appends
    /// the fallback reply instead of returning an error.
    pub async fn send_message(&mut self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let conversation = if self.config.persistence_enabled {
            match self.active_conversation.clone() {
                Some(id) => Some(id),
                None => {
                    debug!("send_message ignored: no active conversation");
                    return Ok(());
                }
            }
        } else {
            None
        };

        let text = text.to_string();
        let is_search = self.input.mode().is_search();
        self.reset_input();

        info!(
            "Sending {} message: {}",
            if is_search { "search" } else { "chat" },
            truncate_chars(&text, 60)
        );

        match conversation {
            Some(id) => self.send_persisted(id, text, is_search).await,
            None => {
                self.send_local(text, is_search).await;
                Ok(())
            }
        }
    }

    async fn send_persisted(
        &mut self,
        conversation: ConversationId,
        text: String,
        is_search: bool,
    ) -> Result<(), SessionError> {
        let store = self.chat_store()?;

        // "First message" means the store held none when the send started.
        let is_first = store.message_count(&conversation).await? == 0;

        store
            .append_message(&conversation, NewMessage::user(text.clone()))
            .await?;
        self.pump().await;

        if is_first {
            let title = Conversation::title_from_first_message(&text);
            if let Err(e) = store.update_title(&conversation, &title).await {
                warn!("Could not rename conversation {}: {}", conversation, e);
                self.alert(format!("Could not rename conversation: {}", e));
            }
        }

        let reply = self.ask_backend(&text, is_search).await;
        store.append_message(&conversation, reply).await?;
        self.pump().await;
        Ok(())
    }

    async fn send_local(&mut self, text: String, is_search: bool) {
        self.push_local(NewMessage::user(text.clone()));
        let reply = self.ask_backend(&text, is_search).await;
        self.push_local(reply);
    }

    async fn ask_backend(&self, text: &str, is_search: bool) -> NewMessage {
        match self.backend.send(text, is_search).await {
            Ok(reply) => NewMessage::bot(reply, is_search),
            Err(e) => {
                warn!("Assistant backend failed: {}", e);
                NewMessage::fallback()
            }
        }
    }

    fn push_local(&mut self, message: NewMessage) {
        // Keep creation times non-decreasing so ordering is append order.
        let now = Utc::now();
        let created_at = match self.messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        self.messages.push(message.stamped(created_at));
        self.emit(UiEvent::MessagesUpdated(self.messages.len()));
    }

    // ==================== Voice input ====================

    /// Start dictation, or stop it when already listening.
    pub async fn toggle_voice_input(&mut self) -> Result<(), SessionError> {
        let speech = match &self.speech {
            Some(speech) if speech.is_supported() => speech.clone(),
            _ => {
                self.alert("Speech input is not supported".to_string());
                return Err(SessionError::SpeechUnsupported);
            }
        };

        if self.listening {
            debug!("Stopping voice input");
            self.speech_subscription = None;
            self.set_listening(false);
            return Ok(());
        }

        let id = self.next_subscription_id();
        let tx = self.events_tx.clone();
        let sink: SpeechSink = Arc::new(move |event| {
            let _ = tx.send(SessionEvent::Speech {
                subscription: id,
                event,
            });
        });

        match speech.listen(sink).await {
            Ok(handle) => {
                self.speech_subscription = Some(Tracked {
                    id,
                    _handle: handle,
                });
                self.set_listening(true);
                self.pump().await;
                Ok(())
            }
            Err(SpeechError::Unsupported) => {
                self.alert("Speech input is not supported".to_string());
                Err(SessionError::SpeechUnsupported)
            }
            Err(SpeechError::Failed(code)) => {
                warn!("Speech recognition failed to start: {}", code);
                self.alert(format!("Speech recognition error: {}", code));
                Ok(())
            }
        }
    }

    // ==================== Event handling ====================

    async fn apply_identity(&mut self, identity: Option<Identity>) {
        match identity {
            Some(identity) => {
                self.redirect_pending = false;
                if self.identity.as_ref() != Some(&identity) {
                    info!("Signed in as {}", identity.display_name());
                    self.clear_chat_state();
                    self.identity = Some(identity.clone());
                    if self.config.persistence_enabled
                        && let Err(e) = self.subscribe_conversations(&identity).await
                    {
                        warn!("Could not load conversations: {}", e);
                        self.alert(format!("Could not load conversations: {}", e));
                    }
                }
            }
            None => {
                if self.identity.take().is_some() {
                    info!("Auth provider reported sign-out");
                }
                self.clear_chat_state();
            }
        }
        self.refresh_state();
    }

    async fn apply_conversations(
        &mut self,
        subscription: SubscriptionId,
        conversations: Vec<Conversation>,
    ) {
        if !Tracked::is(&self.conversations_subscription, subscription) {
            debug!("Discarding stale conversation snapshot");
            return;
        }

        self.conversations = conversations;
        self.emit(UiEvent::ConversationsUpdated(self.conversations.len()));

        // Most recently created conversation wins when nothing is active yet.
        if self.active_conversation.is_none()
            && let Some(newest) = self.conversations.first().map(|c| c.id.clone())
            && let Err(e) = self.activate(newest).await
        {
            warn!("Could not open conversation: {}", e);
            self.alert(format!("Could not open conversation: {}", e));
        }
    }

    fn apply_messages(&mut self, subscription: SubscriptionId, messages: Vec<Message>) {
        if !Tracked::is(&self.messages_subscription, subscription) {
            debug!("Discarding stale message snapshot");
            return;
        }
        self.messages = messages;
        self.emit(UiEvent::MessagesUpdated(self.messages.len()));
    }

    fn apply_speech_event(&mut self, subscription: SubscriptionId, event: SpeechEvent) {
        if !Tracked::is(&self.speech_subscription, subscription) {
            debug!("Discarding speech event from a finished session");
            return;
        }
        match event {
            SpeechEvent::Result(transcript) => {
                self.input.set_text(transcript);
                self.emit_input();
                self.set_listening(false);
            }
            SpeechEvent::End => {
                self.speech_subscription = None;
                self.set_listening(false);
            }
            SpeechEvent::Error(code) => {
                warn!("Speech recognition error: {}", code);
                self.speech_subscription = None;
                self.set_listening(false);
                self.alert(format!("Speech recognition error: {}", code));
            }
        }
    }

    // ==================== Internals ====================

    async fn finish_sign_in(&mut self, result: Result<(), AuthError>) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                self.pump().await;
                Ok(())
            }
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                self.alert(format!("Sign-in failed: {}", e));
                Err(SessionError::AuthFailure(e))
            }
        }
    }

    async fn subscribe_conversations(&mut self, identity: &Identity) -> Result<(), SessionError> {
        let store = self.chat_store()?;
        let id = self.next_subscription_id();
        let sink = self.snapshot_sink(id, |subscription, conversations| {
            SessionEvent::Conversations {
                subscription,
                conversations,
            }
        });
        let handle = store.subscribe_conversations(&identity.uid, sink).await?;
        self.conversations_subscription = Some(Tracked {
            id,
            _handle: handle,
        });
        Ok(())
    }

    /// Switch the message stream to `id`, cancelling the previous one.
    async fn activate(&mut self, id: ConversationId) -> Result<(), SessionError> {
        let store = self.chat_store()?;
        debug!("Activating conversation {}", id);

        self.messages_subscription = None;
        self.messages.clear();
        self.active_conversation = Some(id.clone());
        self.emit(UiEvent::MessagesUpdated(0));
        self.refresh_state();

        let sub_id = self.next_subscription_id();
        let sink = self.snapshot_sink(sub_id, |subscription, messages| SessionEvent::Messages {
            subscription,
            messages,
        });
        let handle = store.subscribe_messages(&id, sink).await?;
        self.messages_subscription = Some(Tracked {
            id: sub_id,
            _handle: handle,
        });
        Ok(())
    }

    /// Drop every store subscription and the state derived from them.
    fn clear_chat_state(&mut self) {
        self.conversations_subscription = None;
        self.messages_subscription = None;

        if !self.conversations.is_empty() {
            self.conversations.clear();
            self.emit(UiEvent::ConversationsUpdated(0));
        }
        self.active_conversation = None;
        if self.config.persistence_enabled && !self.messages.is_empty() {
            self.messages.clear();
            self.emit(UiEvent::MessagesUpdated(0));
        }
        self.set_side_menu(false);
    }

    fn snapshot_sink<T: Send + 'static>(
        &self,
        id: SubscriptionId,
        wrap: fn(SubscriptionId, Vec<T>) -> SessionEvent,
    ) -> SnapshotSink<T> {
        let tx = self.events_tx.clone();
        Arc::new(move |snapshot| {
            let _ = tx.send(wrap(id, snapshot));
        })
    }

    fn next_subscription_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }

    fn auth_provider(&self) -> Result<Arc<dyn AuthProvider>, SessionError> {
        self.auth.clone().ok_or_else(|| {
            SessionError::AuthFailure(AuthError::Unsupported(
                "no auth provider configured".to_string(),
            ))
        })
    }

    fn chat_store(&self) -> Result<Arc<dyn ChatStore>, SessionError> {
        self.store.clone().ok_or_else(|| {
            SessionError::Store(StoreError::Unavailable(
                "no chat store configured".to_string(),
            ))
        })
    }

    fn reset_input(&mut self) {
        if self.input != InputState::new() {
            self.input = InputState::new();
            self.emit_input();
        }
    }

    fn set_listening(&mut self, listening: bool) {
        if self.listening != listening {
            self.listening = listening;
            self.emit(UiEvent::ListeningChanged(listening));
        }
    }

    fn set_side_menu(&mut self, open: bool) {
        if self.side_menu_open != open {
            self.side_menu_open = open;
            self.emit(UiEvent::SideMenuChanged(open));
        }
    }

    fn refresh_state(&mut self) {
        let state = self.state();
        if state != self.last_state {
            debug!("Session state: {} -> {}", self.last_state, state);
            self.last_state = state;
            self.emit(UiEvent::SessionChanged(state));
        }
    }

    fn emit_input(&self) {
        self.emit(UiEvent::InputUpdated {
            mode: self.input.mode(),
            text: self.input.text().to_string(),
        });
    }

    fn alert(&self, message: String) {
        self.emit(UiEvent::Alert(message));
    }

    fn emit(&self, event: UiEvent) {
        if let Some(tx) = &self.ui_tx {
            let _ = tx.send(event);
        }
    }
}
