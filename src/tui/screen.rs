//! View model of the demo screen.
//!
//! Holds exactly what the screen shows: the token, the last title and body,
//! and an optional toast. It is written by the screen's state observer and
//! read by the renderer; it never reads the shared state on its own after
//! construction.

use std::time::{Duration, Instant};

use crate::constants::{EMPTY_BODY_PLACEHOLDER, EMPTY_TITLE_PLACEHOLDER};
use crate::observe::StateChange;
use crate::platform::TapAction;
use crate::state::{RegistrationToken, StateSnapshot};

/// Transient message in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    text: String,
    expires_at: Instant,
}

impl Toast {
    /// Toast showing `text` until `now + duration`.
    pub fn new(text: impl Into<String>, now: Instant, duration: Duration) -> Self {
        Self {
            text: text.into(),
            expires_at: now + duration,
        }
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the toast should be gone at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Everything the demo screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenModel {
    token: Option<RegistrationToken>,
    last_title: Option<String>,
    last_body: Option<String>,
    toast: Option<Toast>,
}

impl ScreenModel {
    /// Model initialised from a state read.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Self {
        let mut model = Self {
            token: snapshot.token.clone(),
            ..Self::default()
        };
        if let Some(message) = &snapshot.message {
            model.last_title = message.title().map(str::to_string);
            model.last_body = message.body().map(str::to_string);
        }
        model
    }

    /// Applies one observed change. A message replaces both title and body.
    pub fn apply(&mut self, change: &StateChange) {
        match change {
            StateChange::TokenChanged(token) => self.token = Some(token.clone()),
            StateChange::MessageChanged(event) => {
                self.last_title = event.title().map(str::to_string);
                self.last_body = event.body().map(str::to_string);
            }
        }
    }

    /// Seeds title and body from a notification tap.
    ///
    /// A tap carrying neither field leaves the screen as it is.
    pub fn apply_tap(&mut self, tap: &TapAction) {
        if tap.title.is_none() && tap.body.is_none() {
            return;
        }
        self.last_title = tap.title.clone();
        self.last_body = tap.body.clone();
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<&RegistrationToken> {
        self.token.as_ref()
    }

    /// Token text for the token card; empty when there is none.
    pub fn token_text(&self) -> &str {
        self.token.as_ref().map_or("", RegistrationToken::as_str)
    }

    /// Title card text, with the placeholder for a blank title.
    pub fn title_text(&self) -> &str {
        non_blank(self.last_title.as_deref()).unwrap_or(EMPTY_TITLE_PLACEHOLDER)
    }

    /// Message card text, with the placeholder for a blank body.
    pub fn body_text(&self) -> &str {
        non_blank(self.last_body.as_deref()).unwrap_or(EMPTY_BODY_PLACEHOLDER)
    }

    /// Shows `text` in the footer for `duration`.
    pub fn show_toast(&mut self, text: impl Into<String>, now: Instant, duration: Duration) {
        self.toast = Some(Toast::new(text, now, duration));
    }

    /// Drops the toast once it has expired.
    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.is_expired(now)) {
            self.toast = None;
        }
    }

    /// Visible toast, if any.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}
