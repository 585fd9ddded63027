//! Delivery callback adapter.
//!
//! Entry point for the messaging transport. Translates its two inbound
//! events into state writes:
//!
//! - token issued or refreshed → [`NotificationState::set_token`]
//! - message received → [`NotificationState::set_message`], then a system
//!   notification through the [`NotificationPresenter`]
//!
//! The transport calls in from its own thread. Nothing here blocks on the UI
//! and nothing here fails: a notification that cannot be shown is logged and
//! the state write stands.
//!
//! # Payload
//!
//! Messages are read from the *data* payload only: `title` and `body` keys of
//! a string-to-string map. Absent keys become `None`.

// Rust guideline compliant 2026-02

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::platform::{NotificationChannel, NotificationPresenter, SystemNotification};
use crate::state::{NotificationEvent, RegistrationToken, SharedNotificationState};

/// Data payload of an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundData(HashMap<String, String>);

impl InboundData {
    /// Payload from key/value pairs.
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    /// Builds a payload from a JSON value, keeping string entries only.
    ///
    /// Anything that is not an object yields an empty payload; non-string
    /// values are dropped with a warning. Neither is treated as a fault.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                log::warn!("[Delivery] Ignoring non-object data payload");
            }
            return Self::default();
        };
        let entries = object
            .iter()
            .filter_map(|(key, value)| match value.as_str() {
                Some(text) => Some((key.clone(), text.to_string())),
                None => {
                    log::warn!("[Delivery] Ignoring non-string data value for '{}'", key);
                    None
                }
            })
            .collect();
        Self(entries)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `title` entry.
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// The `body` entry.
    pub fn body(&self) -> Option<&str> {
        self.get("body")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InboundData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Adapter the messaging transport calls into.
#[derive(Clone)]
pub struct DeliveryCallback {
    state: SharedNotificationState,
    presenter: Arc<dyn NotificationPresenter>,
    channel: NotificationChannel,
}

impl std::fmt::Debug for DeliveryCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryCallback")
            .field("channel", &self.channel.id)
            .finish_non_exhaustive()
    }
}

impl DeliveryCallback {
    /// Creates an adapter writing into `state` and posting through `presenter`.
    pub fn new(state: SharedNotificationState, presenter: Arc<dyn NotificationPresenter>) -> Self {
        Self {
            state,
            presenter,
            channel: NotificationChannel::push_messages(),
        }
    }

    /// The backend issued or refreshed this installation's token.
    pub fn on_token_refreshed(&self, token: impl Into<String>) {
        let token = RegistrationToken::new(token);
        log::info!("[Delivery] Refreshed token: {:?}", token);
        self.state.set_token(token);
    }

    /// A message arrived.
    ///
    /// Stores it, then asks the presenter to show it. Presenter failures
    /// are logged only.
    pub fn on_message_received(&self, data: &InboundData) {
        let title = data.title();
        let body = data.body();
        log::info!("[Delivery] Payload title={:?} body={:?}", title, body);

        let event = NotificationEvent::new(title.map(str::to_string), body.map(str::to_string));
        self.state.set_message(event);

        self.present(title, body);
    }

    fn present(&self, title: Option<&str>, body: Option<&str>) {
        if let Err(e) = self.presenter.ensure_channel(&self.channel) {
            log::warn!("[Delivery] Could not create channel '{}': {:#}", self.channel.id, e);
        }
        let notification = SystemNotification::for_message(title, body);
        if let Err(e) = self.presenter.show(&notification) {
            log::warn!("[Delivery] Could not show notification: {:#}", e);
        }
    }
}
