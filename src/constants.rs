//! Application-wide constants for cloud-messaging.
//!
//! Centralizes the notification channel identity, display defaults and UI
//! timing so they are not scattered as magic values.
//!
//! # Categories
//!
//! - **Notification channel**: identity of the channel messages are posted on
//! - **Display**: fallback text for absent or blank fields
//! - **UI**: frame timing and toast duration

use std::time::Duration;

// ============================================================================
// Notification channel
// ============================================================================

/// Identifier of the channel incoming messages are posted on.
pub const CHANNEL_ID: &str = "fcm_default_channel";

/// User-visible name of [`CHANNEL_ID`].
pub const CHANNEL_NAME: &str = "Firebase Notifications";

// ============================================================================
// Display
// ============================================================================

/// Title shown on a system notification when the message has none.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New notification!";

/// Screen header.
pub const SCREEN_TITLE: &str = "Firebase Cloud Messaging Demo";

/// Placeholder for a blank last title.
pub const EMPTY_TITLE_PLACEHOLDER: &str = "—";

/// Placeholder for a blank last body.
pub const EMPTY_BODY_PLACEHOLDER: &str = "No messages yet";

/// Toast shown after the token is copied.
pub const TOKEN_COPIED_TOAST: &str = "Token copied";

// ============================================================================
// UI
// ============================================================================

/// Default delay between UI frames.
///
/// Each frame pumps the change dispatcher, handles input and redraws.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(50);

/// Default time a toast stays on screen.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2000);

/// Sleep between dispatcher pumps in headless mode.
pub const HEADLESS_PUMP_INTERVAL: Duration = Duration::from_millis(100);
