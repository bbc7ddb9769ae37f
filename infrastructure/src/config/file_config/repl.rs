//! REPL configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Spinner while a reply is pending
    pub show_progress: bool,
    /// Line history file; `~/` expands to the home directory
    pub history_file: Option<String>,
    pub color: bool,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            color: true,
        }
    }
}

impl FileReplConfig {
    /// Configured history file with a leading `~/` expanded. A blank value
    /// counts as unset.
    pub fn history_path(&self) -> Option<PathBuf> {
        let raw = self.history_file.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path_unset() {
        assert_eq!(FileReplConfig::default().history_path(), None);
    }

    #[test]
    fn test_history_path_plain() {
        let config = FileReplConfig {
            history_file: Some("/tmp/logangpt-history".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.history_path(),
            Some(PathBuf::from("/tmp/logangpt-history"))
        );
    }

    #[test]
    fn test_history_path_expands_home() {
        let config = FileReplConfig {
            history_file: Some("~/.logangpt_history".to_string()),
            ..Default::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.history_path(), Some(home.join(".logangpt_history")));
        }
    }

    #[test]
    fn test_history_path_blank_is_none() {
        let config = FileReplConfig {
            history_file: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.history_path(), None);
    }
}
