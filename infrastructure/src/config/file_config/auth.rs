//! Auth configuration from TOML (`[auth]` section)

use super::ConfigValidationError;
use crate::auth::normalize_email;
use serde::{Deserialize, Serialize};

/// Which auth adapter to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAuthProvider {
    /// In-process accounts
    #[default]
    Local,
    /// Hosted Identity Toolkit project
    IdentityToolkit,
}

/// Raw auth configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    pub provider: FileAuthProvider,
    /// Web API key of the identity project
    pub api_key: Option<String>,
    /// Override of the Identity Toolkit endpoint
    pub endpoint: Option<String>,
    /// Google account that popup/redirect sign-in resolves to (local provider)
    pub federated_email: Option<String>,
}

impl FileAuthConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigValidationError> {
        let has_key = self
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if self.provider == FileAuthProvider::IdentityToolkit && !has_key {
            return Err(ConfigValidationError::MissingApiKey);
        }
        if let Some(email) = self.federated_email()
            && normalize_email(email).is_err()
        {
            return Err(ConfigValidationError::InvalidFederatedEmail(
                email.to_string(),
            ));
        }
        Ok(())
    }

    /// Configured federated account; blank counts as unset.
    pub fn federated_email(&self) -> Option<&str> {
        self.federated_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
