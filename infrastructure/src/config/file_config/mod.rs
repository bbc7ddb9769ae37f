//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod auth;
mod backend;
mod repl;
mod session;

pub use auth::{FileAuthConfig, FileAuthProvider};
pub use backend::FileBackendConfig;
pub use repl::FileReplConfig;
pub use session::FileSessionConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("backend.base_url must be empty or an absolute http(s) URL, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("auth.api_key is required for the identity_toolkit provider")]
    MissingApiKey,

    #[error("auth.federated_email is not an e-mail address: '{0}'")]
    InvalidFederatedEmail(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Assistant server settings
    pub backend: FileBackendConfig,
    /// Session feature flags
    pub session: FileSessionConfig,
    /// Auth provider settings
    pub auth: FileAuthConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.backend.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
