//! Domain layer for LoganGPT
//!
//! This crate contains the core entities and the pure state machines of the
//! chat client. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! - **Conversation**: a titled thread owned by one user identity
//! - **Message**: an immutable, append-only entry of a conversation
//! - **Input mode**: normal typing, the `/` command menu, or web search
//! - **Session state**: derived from identity, redirect and active conversation

pub mod chat;
pub mod core;
pub mod input;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use chat::{
    conversation::{Conversation, ConversationId},
    identity::{Identity, UserId},
    message::{FALLBACK_REPLY, GREETING, Message, NewMessage, Sender},
};
pub use core::error::DomainError;
pub use input::mode::{COMMAND_TRIGGER, InputMode, InputState};
pub use session::state::{AuthFlow, SessionState};
