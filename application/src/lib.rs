//! Application layer for LoganGPT
//!
//! This crate contains the session controller, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    assistant_backend::{AssistantBackend, BackendError},
    auth_provider::{AuthError, AuthProvider, AuthSink},
    chat_store::{ChatStore, SnapshotSink, StoreError},
    speech_input::{SpeechError, SpeechEvent, SpeechInput, SpeechSink},
    subscription::Subscription,
    ui_event::UiEvent,
};
pub use use_cases::session_controller::{
    ConversationSessionController, SessionError, SessionEvent, SubscriptionId,
};
