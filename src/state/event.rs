//! Values held by the notification state.
//!
//! Both types are immutable once built. A token refresh replaces the whole
//! token; a new message replaces the whole event.

// Rust guideline compliant 2026-02

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A push message as the application sees it.
///
/// Title and body are optional because the sender may omit either key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    title: Option<String>,
    body: Option<String>,
    received_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Creates an event stamped with the current time.
    pub fn new(title: Option<String>, body: Option<String>) -> Self {
        Self::received_at(title, body, Utc::now())
    }

    /// Creates an event with an explicit arrival time.
    pub fn received_at(
        title: Option<String>,
        body: Option<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title,
            body,
            received_at,
        }
    }

    /// Message title, if the sender provided one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Message body, if the sender provided one.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// When the message reached this process.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// Opaque identifier issued by the messaging backend for this installation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationToken(String);

impl RegistrationToken {
    /// Wraps a token string as issued by the backend.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RegistrationToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for RegistrationToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl std::fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens end up in log lines; only show a prefix.
impl std::fmt::Debug for RegistrationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "RegistrationToken({prefix}…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = NotificationEvent::new(Some("Hi".to_string()), None);
        assert_eq!(event.title(), Some("Hi"));
        assert_eq!(event.body(), None);
    }

    #[test]
    fn test_token_debug_is_truncated() {
        let token = RegistrationToken::new("abcdefghijklmnopqrstuvwxyz");
        let debug = format!("{:?}", token);
        assert!(debug.starts_with("RegistrationToken(abcdefgh"));
        assert!(!debug.contains("xyz"));
    }

    #[test]
    fn test_token_debug_short_token() {
        let token = RegistrationToken::new("ab");
        assert_eq!(format!("{:?}", token), "RegistrationToken(ab…)");
    }

    #[test]
    fn test_token_display_is_full() {
        let token = RegistrationToken::from("token-123");
        assert_eq!(token.to_string(), "token-123");
    }
}
