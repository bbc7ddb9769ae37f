//! Assistant server configuration from TOML (`[backend]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Raw backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Root of the assistant server; `/api/chat` and `/api/search` hang off it
    pub base_url: String,
    /// Request timeout in seconds (none: wait indefinitely)
    pub timeout_seconds: Option<u64>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl FileBackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Base URL to dial. A blank value means the client's own origin, which
    /// for a terminal client is the local default server.
    pub fn resolved_base_url(&self) -> &str {
        match self.base_url.trim() {
            "" => DEFAULT_BASE_URL,
            url => url,
        }
    }

    pub(super) fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        let invalid = || ConfigValidationError::InvalidBaseUrl(self.base_url.clone());
        let url = reqwest::Url::parse(self.resolved_base_url()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_base(url: &str) -> FileBackendConfig {
        FileBackendConfig {
            base_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_base_url_means_default_origin() {
        for blank in ["", "   "] {
            let config = with_base(blank);
            assert_eq!(config.resolved_base_url(), DEFAULT_BASE_URL);
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let config = with_base("  https://chat.example.com/ ");
        assert_eq!(config.resolved_base_url(), "https://chat.example.com/");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_malformed_base_urls_are_rejected() {
        for bad in ["http://", "https://", "localhost:5000", "/api", "ftp://example.com"] {
            assert_eq!(
                with_base(bad).validate(),
                Err(ConfigValidationError::InvalidBaseUrl(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }
}
