//! User identity value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated identity a session acts for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: UserId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            email,
        }
    }

    /// Short name for display: the local part of the e-mail address,
    /// or the uid when no address is known.
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.uid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_uses_email_local_part() {
        let identity = Identity::new("u1", Some("logan@example.com".to_string()));
        assert_eq!(identity.display_name(), "logan");
    }

    #[test]
    fn display_name_falls_back_to_uid() {
        assert_eq!(Identity::new("u1", None).display_name(), "u1");
        assert_eq!(
            Identity::new("u2", Some("@example.com".to_string())).display_name(),
            "u2"
        );
    }
}
