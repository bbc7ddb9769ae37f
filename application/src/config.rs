//! Application-level configuration.
//!
//! Feature flags that select between the variants of the chat session
//! (persisted vs. local-only messages, popup vs. redirect sign-in).

use logangpt_domain::AuthFlow;

/// Session behavior configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Keep conversations in the chat store (requires sign-in).
    ///
    /// When disabled, messages live in an in-memory list for the lifetime of
    /// the session and no identity is needed.
    pub persistence_enabled: bool,
    /// Federated sign-in style of the auth provider.
    pub auth_flow: AuthFlow,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persistence_enabled: true,
            auth_flow: AuthFlow::Popup,
        }
    }
}

impl SessionConfig {
    /// Local-only session: no store, no sign-in.
    pub fn local() -> Self {
        Self {
            persistence_enabled: false,
            ..Self::default()
        }
    }

    pub fn with_auth_flow(mut self, flow: AuthFlow) -> Self {
        self.auth_flow = flow;
        self
    }
}
