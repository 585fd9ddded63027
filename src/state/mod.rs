//! Shared notification state.
//!
//! Holds the latest registration token and the latest message. There is no
//! history: every write replaces the previous value. One instance is built at
//! startup and handed to the delivery callback (writer) and to the UI
//! (reader); it is dropped at shutdown and never persisted.
//!
//! Each field has its own `RwLock`. A write reserves its sequence number,
//! stores the value and queues the change notification while holding the
//! field's write lock, so the stored value, the sequence order and the queue
//! order always agree for that field.

// Rust guideline compliant 2026-02

mod event;

pub use event::{NotificationEvent, RegistrationToken};

use std::sync::{Arc, PoisonError, RwLock};

use crate::observe::{ChangeNotifier, StateChange};

/// Shared reference to the notification state.
pub type SharedNotificationState = Arc<NotificationState>;

/// A value together with the sequence number of the write that stored it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamped<T> {
    /// Write sequence number.
    pub seq: u64,
    /// Stored value.
    pub value: T,
}

/// Both fields read together, for renderers initialising from state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Latest token, if one was issued.
    pub token: Option<RegistrationToken>,
    /// Latest message, if one arrived.
    pub message: Option<NotificationEvent>,
}

/// Latest-value store for the token and the last message.
#[derive(Debug)]
pub struct NotificationState {
    token: RwLock<Option<Stamped<RegistrationToken>>>,
    message: RwLock<Option<Stamped<NotificationEvent>>>,
    notifier: ChangeNotifier,
}

impl NotificationState {
    /// Creates an empty state that reports writes through `notifier`.
    pub fn new(notifier: ChangeNotifier) -> Self {
        Self {
            token: RwLock::new(None),
            message: RwLock::new(None),
            notifier,
        }
    }

    /// Creates an empty state wrapped for sharing.
    pub fn shared(notifier: ChangeNotifier) -> SharedNotificationState {
        Arc::new(Self::new(notifier))
    }

    /// Replaces the stored token and signals the change.
    pub fn set_token(&self, token: RegistrationToken) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        let seq = self.notifier.next_seq();
        *slot = Some(Stamped {
            seq,
            value: token.clone(),
        });
        self.notifier.publish(seq, StateChange::TokenChanged(token));
    }

    /// Replaces the stored message and signals the change.
    pub fn set_message(&self, event: NotificationEvent) {
        let mut slot = self.message.write().unwrap_or_else(PoisonError::into_inner);
        let seq = self.notifier.next_seq();
        *slot = Some(Stamped {
            seq,
            value: event.clone(),
        });
        self.notifier.publish(seq, StateChange::MessageChanged(event));
    }

    /// Latest token, or `None` if none was issued yet.
    pub fn current_token(&self) -> Option<RegistrationToken> {
        self.stamped_token().map(|stamped| stamped.value)
    }

    /// Latest message, or `None` if none arrived yet.
    pub fn current_message(&self) -> Option<NotificationEvent> {
        self.stamped_message().map(|stamped| stamped.value)
    }

    /// Latest token with the sequence number of the write that stored it.
    pub fn stamped_token(&self) -> Option<Stamped<RegistrationToken>> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Latest message with the sequence number of the write that stored it.
    pub fn stamped_message(&self) -> Option<Stamped<NotificationEvent>> {
        self.message
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reads both fields.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            token: self.current_token(),
            message: self.current_message(),
        }
    }
}
