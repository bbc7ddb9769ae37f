//! In-process auth provider

use super::listeners::AuthListeners;
use async_trait::async_trait;
use logangpt_application::ports::auth_provider::{AuthError, AuthProvider, AuthSink};
use logangpt_application::ports::subscription::Subscription;
use logangpt_domain::Identity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_CHARS: usize = 6;

/// One registered account; only the bcrypt hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    uid: String,
    password_hash: String,
}

/// On-disk shape of the account registry, keyed by normalized e-mail.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountRegistry {
    accounts: BTreeMap<String, StoredAccount>,
}

/// Auth provider keeping e-mail accounts on this machine.
///
/// Every registration gets a fresh random uid, so re-registering an address
/// never inherits data owned by an earlier account. With [`open`] the
/// registry is written through to a JSON file and survives restarts.
/// Federated sign-in is only available when a federated identity was
/// configured.
///
/// [`open`]: LocalAuthProvider::open
pub struct LocalAuthProvider {
    registry: AsyncMutex<AccountRegistry>,
    path: Option<PathBuf>,
    hash_cost: u32,
    federated: Option<Identity>,
    pending_redirect: Mutex<Option<Identity>>,
    listeners: AuthListeners,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self {
            registry: AsyncMutex::new(AccountRegistry::default()),
            path: None,
            hash_cost: bcrypt::DEFAULT_COST,
            federated: None,
            pending_redirect: Mutex::new(None),
            listeners: AuthListeners::new(),
        }
    }
}

impl LocalAuthProvider {
    /// Provider whose accounts live only as long as the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider backed by an account file, created on first registration.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref().to_path_buf();
        let registry = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AuthError::Transport(format!("Corrupt account file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AccountRegistry::default(),
            Err(e) => {
                return Err(AuthError::Transport(format!(
                    "Cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        debug!(
            "Opened account file {} ({} accounts)",
            path.display(),
            registry.accounts.len()
        );
        Ok(Self {
            registry: AsyncMutex::new(registry),
            path: Some(path),
            ..Self::default()
        })
    }

    /// bcrypt work factor for new passwords (lower values speed up tests).
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Identity returned by popup and redirect sign-in.
    pub fn with_federated_identity(mut self, identity: Identity) -> Self {
        self.federated = Some(identity);
        self
    }

    /// Federated identity for a Google account address.
    pub fn with_federated_account(self, email: &str) -> Result<Self, AuthError> {
        let email = normalize_email(email)?;
        let identity = Identity::new(format!("google:{}", email), Some(email));
        Ok(self.with_federated_identity(identity))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn federated(&self) -> Result<Identity, AuthError> {
        self.federated.clone().ok_or_else(|| {
            AuthError::Unsupported("Google sign-in is not available offline".to_string())
        })
    }

    async fn persist(&self, registry: &AccountRegistry) -> Result<(), AuthError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(registry)
            .map_err(|e| AuthError::Transport(format!("Cannot encode accounts: {}", e)))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AuthError::Transport(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(path, content).await.map_err(|e| {
            warn!("Failed to write account file {}: {}", path.display(), e);
            AuthError::Transport(format!("Cannot write {}: {}", path.display(), e))
        })
    }
}

/// Lower-cased address, or `InvalidEmail` when it has no `local@domain` shape.
pub(crate) fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(AuthError::InvalidEmail(email.to_string())),
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in_with_popup(&self) -> Result<Identity, AuthError> {
        let identity = self.federated()?;
        info!("Federated sign-in as {}", identity.display_name());
        self.listeners.set(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_redirect(&self) -> Result<(), AuthError> {
        let identity = self.federated()?;
        debug!("Staging redirect sign-in for {}", identity.display_name());
        *self
            .pending_redirect
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(identity);
        Ok(())
    }

    async fn consume_redirect_result(&self) -> Result<Option<Identity>, AuthError> {
        let pending = self
            .pending_redirect
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(identity) = &pending {
            self.listeners.set(Some(identity.clone()));
        }
        Ok(pending)
    }

    async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        let account = self.registry.lock().await.accounts.get(&email).cloned();
        let Some(account) = account else {
            return Err(AuthError::InvalidCredentials);
        };
        if !bcrypt::verify(password, &account.password_hash).unwrap_or(false) {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity::new(account.uid, Some(email));
        self.listeners.set(Some(identity.clone()));
        Ok(identity)
    }

    async fn create_user_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }
        let password_hash = bcrypt::hash(password, self.hash_cost)
            .map_err(|e| AuthError::Rejected(format!("Failed to hash password: {}", e)))?;
        let account = StoredAccount {
            uid: format!("local:{}", Uuid::new_v4()),
            password_hash,
        };

        {
            let mut registry = self.registry.lock().await;
            if registry.accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse);
            }
            registry.accounts.insert(email.clone(), account.clone());
            if let Err(e) = self.persist(&registry).await {
                registry.accounts.remove(&email);
                return Err(e);
            }
        }

        info!("Registered local account {}", email);
        let identity = Identity::new(account.uid, Some(email));
        self.listeners.set(Some(identity.clone()));
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
