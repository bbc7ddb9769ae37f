//! Session state machine

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Federated sign-in style of the auth provider.
///
/// - **Popup**: the sign-in call resolves with the identity in place
/// - **Redirect**: the app leaves and returns; the result is collected once
///   at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFlow {
    #[default]
    Popup,
    Redirect,
}

impl fmt::Display for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFlow::Popup => write!(f, "popup"),
            AuthFlow::Redirect => write!(f, "redirect"),
        }
    }
}

impl std::str::FromStr for AuthFlow {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "popup" => Ok(AuthFlow::Popup),
            "redirect" => Ok(AuthFlow::Redirect),
            _ => Err(DomainError::InvalidAuthFlow(s.to_string())),
        }
    }
}

/// Where a session is in the login/chat flow.
///
/// Always derived from the session's facts, never stored on its own, so it
/// cannot drift from the identity it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A redirect-style sign-in was started and has not come back yet
    AuthPending,
    AuthenticatedNoConversation,
    AuthenticatedWithConversation,
}

impl SessionState {
    pub fn derive(has_identity: bool, redirect_pending: bool, has_active_conversation: bool) -> Self {
        match (has_identity, redirect_pending, has_active_conversation) {
            (true, _, true) => SessionState::AuthenticatedWithConversation,
            (true, _, false) => SessionState::AuthenticatedNoConversation,
            (false, true, _) => SessionState::AuthPending,
            (false, false, _) => SessionState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionState::AuthenticatedNoConversation | SessionState::AuthenticatedWithConversation
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unauthenticated => "signed out",
            SessionState::AuthPending => "signing in",
            SessionState::AuthenticatedNoConversation => "signed in",
            SessionState::AuthenticatedWithConversation => "chatting",
        };
        f.write_str(label)
    }
}
