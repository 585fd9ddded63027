//! Platform collaborators.
//!
//! The engine never talks to the operating system directly. Everything it
//! needs from the outside world goes through the traits in this module:
//!
//! - [`NotificationPresenter`] - shows a system notification
//! - [`PermissionRequester`] - asks the user for notification consent
//! - [`TokenSource`] - fetches the registration token at startup
//! - [`Clipboard`] - copies the token for the user
//!
//! Presenter and clipboard failures are reported as `anyhow::Error` and the
//! callers log them; none of them is ever fatal.

// Rust guideline compliant 2026-02

pub mod configured;
pub mod terminal;

pub use configured::{ConfiguredPermission, ConfiguredTokenSource, DisabledPresenter, LogPresenter};
pub use terminal::{Osc52Clipboard, OscStyle, TerminalPresenter};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{CHANNEL_ID, CHANNEL_NAME, DEFAULT_NOTIFICATION_TITLE};

/// Interruption level of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Shown without sound.
    Low,
    /// Shown with the platform's default sound.
    #[default]
    Default,
    /// Shown as a heads-up notification.
    High,
}

/// Channel a notification is posted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    /// Stable identifier.
    pub id: String,
    /// User-visible name.
    pub name: String,
    /// Interruption level.
    pub importance: Importance,
}

impl NotificationChannel {
    /// The channel incoming push messages are posted on.
    pub fn push_messages() -> Self {
        Self {
            id: CHANNEL_ID.to_string(),
            name: CHANNEL_NAME.to_string(),
            importance: Importance::Default,
        }
    }
}

/// What opening the app from a notification carries along.
///
/// The screen is seeded from these fields, so tapping a notification shows
/// the message it was about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapAction {
    /// Message title, if any.
    pub title: Option<String>,
    /// Message body, if any.
    pub body: Option<String>,
}

/// A notification ready to be shown by a [`NotificationPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNotification {
    /// Channel identifier.
    pub channel_id: String,
    /// Title line; never empty.
    pub title: String,
    /// Body text; may be empty.
    pub body: String,
    /// Dismiss the notification when tapped.
    pub auto_cancel: bool,
    /// Payload delivered when the user taps the notification.
    pub tap_action: TapAction,
}

impl SystemNotification {
    /// Builds the notification for a received message.
    ///
    /// An absent title falls back to [`DEFAULT_NOTIFICATION_TITLE`]; an
    /// absent body becomes empty text.
    pub fn for_message(title: Option<&str>, body: Option<&str>) -> Self {
        Self {
            channel_id: CHANNEL_ID.to_string(),
            title: title.unwrap_or(DEFAULT_NOTIFICATION_TITLE).to_string(),
            body: body.unwrap_or_default().to_string(),
            auto_cancel: true,
            tap_action: TapAction {
                title: title.map(str::to_string),
                body: body.map(str::to_string),
            },
        }
    }
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// The user allowed notifications.
    Granted,
    /// The user refused notifications.
    Denied,
}

impl PermissionStatus {
    /// Whether notifications were allowed.
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Shows system notifications.
pub trait NotificationPresenter: Send + Sync {
    /// Makes sure `channel` exists before anything is posted on it.
    ///
    /// Called before every post; implementations should make repeat calls
    /// cheap.
    fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()>;

    /// Shows one notification.
    fn show(&self, notification: &SystemNotification) -> Result<()>;
}

/// Asks the user for permission to show notifications.
pub trait PermissionRequester: Send + Sync {
    /// Whether this platform needs explicit consent at all.
    fn requires_permission(&self) -> bool;

    /// Asks once and reports the answer.
    fn request(&self) -> PermissionStatus;
}

/// Fetches the registration token when the app starts.
pub trait TokenSource: Send + Sync {
    /// Returns the current token.
    fn fetch(&self) -> Result<String>;
}

/// Places text on the user's clipboard.
pub trait Clipboard: Send + Sync {
    /// Copies `text`.
    fn copy(&self, text: &str) -> Result<()>;
}
