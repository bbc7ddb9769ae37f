//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid auth flow: {0} (expected popup or redirect)")]
    InvalidAuthFlow(String),

    #[error("Invalid sender: {0}")]
    InvalidSender(String),
}
