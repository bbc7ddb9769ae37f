//! Auth Provider port
//!
//! Sign-in, sign-out and identity change notifications. The change
//! notification is the only source of truth for who is signed in.

use super::subscription::Subscription;
use async_trait::async_trait;
use logangpt_domain::Identity;
use std::sync::Arc;
use thiserror::Error;

/// Callback receiving the current identity (or `None` when signed out).
pub type AuthSink = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Errors that can occur during auth operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid e-mail or password")]
    InvalidCredentials,

    #[error("An account with this e-mail already exists")]
    EmailInUse,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(String),

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Auth service unreachable: {0}")]
    Transport(String),

    #[error("Sign-in rejected: {0}")]
    Rejected(String),
}

/// Hosted authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Federated sign-in that resolves in place.
    async fn sign_in_with_popup(&self) -> Result<Identity, AuthError>;

    /// Federated sign-in that leaves the app; the result is collected later
    /// with [`consume_redirect_result`](Self::consume_redirect_result).
    async fn sign_in_with_redirect(&self) -> Result<(), AuthError>;

    /// Collect the outcome of a redirect sign-in. Called once at startup.
    async fn consume_redirect_result(&self) -> Result<Option<Identity>, AuthError>;

    async fn sign_in_with_email(&self, email: &str, password: &str)
    -> Result<Identity, AuthError>;

    async fn create_user_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Register for identity changes.
    ///
    /// The sink receives the current identity right away, then every change
    /// until the returned subscription is cancelled.
    fn on_auth_state_change(&self, sink: AuthSink) -> Subscription;
}
