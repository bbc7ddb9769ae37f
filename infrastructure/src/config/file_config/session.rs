//! Session configuration from TOML (`[session]` section)

use logangpt_application::SessionConfig;
use logangpt_domain::AuthFlow;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Keep conversations in the chat store (requires sign-in)
    pub persistence: bool,
    /// Federated sign-in style
    pub auth_flow: AuthFlow,
    /// Chat store file; unset uses the data dir, empty keeps it in memory
    pub store_file: Option<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            persistence: true,
            auth_flow: AuthFlow::Popup,
            store_file: None,
        }
    }
}

impl FileSessionConfig {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            persistence_enabled: self.persistence,
            auth_flow: self.auth_flow,
        }
    }

    /// Where the chat store writes through to, if anywhere.
    pub fn store_path(&self) -> Option<PathBuf> {
        match self.store_file.as_deref() {
            Some("") => None,
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::data_dir().map(|d| d.join("logangpt").join("chats.json")),
        }
    }

    /// Local account file kept beside the chat store (`chats.json` →
    /// `chats.accounts.json`); none when the store is memory-only.
    pub fn accounts_path(&self) -> Option<PathBuf> {
        self.store_path()
            .map(|path| path.with_extension("accounts.json"))
    }
}
