//! Cloud Messaging - push notification state synchronization.
//!
//! Keeps the latest registration token and the latest received message, and
//! makes sure every interested observer sees them.
//!
//! # Architecture
//!
//! ```text
//! feed transport ──> DeliveryCallback ──> NotificationState ──> UiDispatcher ──> observers
//!   (bg thread)          │                  (latest wins)       (UI thread)     screen, log
//!                        └──> NotificationPresenter (system notification)
//! ```
//!
//! # Modules
//!
//! - [`state`] - Latest-value store for token and message
//! - [`observe`] - Observer registry and UI-thread dispatch
//! - [`delivery`] - Adapter the messaging transport calls into
//! - [`platform`] - Presenter, permission, token source and clipboard seams
//! - [`transport`] - JSON-lines feed standing in for the push transport
//! - [`tui`] - Demo screen
//! - [`app`] - Wiring and startup
//! - [`config`] - Configuration loading/saving

// Library modules
pub mod app;
pub mod delivery;
pub mod observe;
pub mod platform;
pub mod state;
pub mod transport;
pub mod tui;

pub mod config;
pub mod constants;
pub mod env;

// Re-export commonly used types
pub use app::{App, Collaborators};
pub use config::Config;
pub use delivery::{DeliveryCallback, InboundData};
pub use observe::{StateChange, Subscription, UiDispatcher};
pub use state::{NotificationEvent, NotificationState, RegistrationToken, SharedNotificationState};
