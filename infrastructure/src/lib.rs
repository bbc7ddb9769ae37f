//! Infrastructure layer for LoganGPT
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod auth;
pub mod backend;
pub mod chat_store;
pub mod config;
pub mod speech;

// Re-export commonly used types
pub use auth::{IdentityToolkitAuthProvider, LocalAuthProvider};
pub use backend::HttpAssistantBackend;
pub use chat_store::InMemoryChatStore;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuthConfig, FileAuthProvider, FileBackendConfig,
    FileConfig, FileReplConfig, FileSessionConfig,
};
pub use speech::TerminalSpeechInput;
