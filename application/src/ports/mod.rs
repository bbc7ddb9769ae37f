//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! Every collaborator of the session controller is injected through one of
//! these traits, so tests can substitute fakes.

pub mod assistant_backend;
pub mod auth_provider;
pub mod chat_store;
pub mod speech_input;
pub mod subscription;
pub mod ui_event;
