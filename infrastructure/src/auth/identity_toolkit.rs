//! Identity Toolkit REST adapter
//!
//! E-mail/password accounts of a hosted identity project:
//! `accounts:signInWithPassword` and `accounts:signUp`. Federated
//! (Google) sign-in needs a browser and is reported as unsupported.

use super::listeners::AuthListeners;
use super::local::normalize_email;
use async_trait::async_trait;
use logangpt_application::ports::auth_provider::{AuthError, AuthProvider, AuthSink};
use logangpt_application::ports::subscription::Subscription;
use logangpt_domain::Identity;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Public endpoint of the hosted service
pub const DEFAULT_IDENTITY_TOOLKIT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
const SIGN_UP_PATH: &str = "/v1/accounts:signUp";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a service error code (e.g. `WEAK_PASSWORD : Password should be ...`)
/// to an [`AuthError`].
fn map_error_code(message: &str, email: &str) -> AuthError {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "INVALID_EMAIL" => AuthError::InvalidEmail(email.to_string()),
        _ => AuthError::Rejected(message.to_string()),
    }
}

/// Auth provider backed by the Identity Toolkit REST API.
pub struct IdentityToolkitAuthProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    listeners: AuthListeners,
}

impl IdentityToolkitAuthProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AuthError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AuthError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            listeners: AuthListeners::new(),
        })
    }

    async fn password_call(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        let request = PasswordRequest {
            email: &email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(format!("{}{}", self.endpoint, path))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => map_error_code(&envelope.error.message, &email),
                Err(_) => {
                    warn!("Unexpected auth error response ({}): {}", status, body);
                    AuthError::Transport(format!("HTTP error: {}", status.as_u16()))
                }
            });
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("Invalid response body: {}", e)))?;
        debug!("Identity Toolkit accepted {}", email);

        let identity = Identity::new(account.local_id, account.email.or(Some(email)));
        self.listeners.set(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitAuthProvider {
    async fn sign_in_with_popup(&self) -> Result<Identity, AuthError> {
        Err(AuthError::Unsupported(
            "Google sign-in requires a browser".to_string(),
        ))
    }

    async fn sign_in_with_redirect(&self) -> Result<(), AuthError> {
        Err(AuthError::Unsupported(
            "Google sign-in requires a browser".to_string(),
        ))
    }

    async fn consume_redirect_result(&self) -> Result<Option<Identity>, AuthError> {
        Ok(None)
    }

    async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let identity = self.password_call(SIGN_IN_PATH, email, password).await?;
        info!("Signed in as {}", identity.display_name());
        Ok(identity)
    }

    async fn create_user_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let identity = self.password_call(SIGN_UP_PATH, email, password).await?;
        info!("Registered {}", identity.display_name());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.listeners.set(None);
        Ok(())
    }

    fn on_auth_state_change(&self, sink: AuthSink) -> Subscription {
        self.listeners.register(sink)
    }
}
