//! Login credentials.

use std::fmt;

/// Identifier and secret used for one login + fetch + retry cycle.
///
/// The secret is redacted from `Debug` output so credentials never end up
/// in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Account identifier (the phone number used on the portal).
    pub identifier: String,
    /// Account password.
    pub secret: String,
}

impl SessionCredentials {
    /// Creates a new credential pair.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Returns true when both the identifier and the secret are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Who started a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginOrigin {
    /// The user entered credentials explicitly.
    User,
    /// Stored credentials were replayed without user interaction.
    Automatic,
}

impl LoginOrigin {
    /// Returns true for automatic logins.
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = SessionCredentials::new("09012345678", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("09012345678"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_is_complete() {
        assert!(SessionCredentials::new("id", "pw").is_complete());
        assert!(!SessionCredentials::new("id", "  ").is_complete());
        assert!(!SessionCredentials::new("", "pw").is_complete());
    }
}
