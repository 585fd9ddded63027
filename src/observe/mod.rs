//! Change notification for the shared notification state.
//!
//! Writers never call observers directly. Every state write is stamped with a
//! sequence number and pushed into a channel; the UI thread drains that
//! channel with [`UiDispatcher::pump`] and invokes the registered callbacks
//! in registration order.
//!
//! # Architecture
//!
//! ```text
//! delivery thread ──set_token/set_message──> NotificationState
//!                                               │ ChangeNotifier (unbounded mpsc)
//!                                               ▼
//! UI thread ──pump()──> ObserverRegistry ──> callback 1, callback 2, ...
//! ```
//!
//! # Late registration
//!
//! An observer only receives changes sequenced after it subscribed, even if
//! older changes are still sitting in the queue. It reads the current state
//! once at registration instead; "latest wins" makes replay unnecessary.
//!
//! # Unsubscribe
//!
//! Each observer has its own gate. Dispatch holds the gate for the duration
//! of the callback and re-checks the active flag under it, so once
//! [`Subscription::unsubscribe`] returns the callback will not run again.

// Rust guideline compliant 2026-02

mod dispatch;

pub use dispatch::{ChangeNotifier, UiDispatcher};

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::state::{NotificationEvent, RegistrationToken};

/// A single state write, as delivered to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateChange {
    /// The registration token was issued or refreshed.
    TokenChanged(RegistrationToken),
    /// A new message replaced the previous one.
    MessageChanged(NotificationEvent),
}

impl StateChange {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenChanged(_) => "token",
            Self::MessageChanged(_) => "message",
        }
    }
}

/// A [`StateChange`] tagged with its write sequence number.
#[derive(Clone, Debug)]
pub struct SequencedChange {
    /// Position of the write in the process-wide write order.
    pub seq: u64,
    /// The new value.
    pub change: StateChange,
}

/// Process-wide write counter shared by the state and the registry.
///
/// Sequence numbers start at 1; 0 means "nothing written yet".
#[derive(Clone, Debug, Default)]
pub struct ChangeSequence(Arc<AtomicU64>);

impl ChangeSequence {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next sequence number.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently reserved sequence number.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Callback invoked on the UI thread for each change.
pub type ObserverCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Identifier assigned to each subscription.
pub type ObserverId = u64;

thread_local! {
    // Observer whose callback is running on this thread, if any.
    static DISPATCHING: Cell<Option<ObserverId>> = const { Cell::new(None) };
}

struct ObserverSlot {
    id: ObserverId,
    /// Changes with `seq <= registered_after` predate this observer.
    registered_after: u64,
    active: AtomicBool,
    callback: Mutex<ObserverCallback>,
}

impl ObserverSlot {
    fn deliver(&self, change: &SequencedChange) -> bool {
        if change.seq <= self.registered_after || !self.active.load(Ordering::SeqCst) {
            return false;
        }
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        // Unsubscribe may have won the race for the gate.
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        let previous = DISPATCHING.with(|d| d.replace(Some(self.id)));
        (callback)(&change.change);
        DISPATCHING.with(|d| d.set(previous));
        true
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        let inside_own_callback = DISPATCHING.with(|d| d.get() == Some(self.id));
        if !inside_own_callback {
            // Wait out a callback that is running right now.
            drop(self.callback.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    slots: Mutex<Vec<Arc<ObserverSlot>>>,
    next_id: AtomicU64,
}

/// Ordered list of observers.
///
/// Cheap to clone; clones share the same list. Subscribing is allowed from
/// any thread, including from inside a callback.
#[derive(Clone)]
pub struct ObserverRegistry {
    inner: Arc<RegistryInner>,
    sequence: ChangeSequence,
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .field("sequence", &self.sequence.current())
            .finish()
    }
}

impl ObserverRegistry {
    /// Creates an empty registry reading registration points from `sequence`.
    pub fn new(sequence: ChangeSequence) -> Self {
        Self {
            inner: Arc::new(RegistryInner::default()),
            sequence,
        }
    }

    /// Registers a callback for future changes.
    ///
    /// The callback sees only writes sequenced after this call. Read the
    /// state's `current_*` accessors afterwards to pick up existing values.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let slot = Arc::new(ObserverSlot {
            id,
            registered_after: self.sequence.current(),
            active: AtomicBool::new(true),
            callback: Mutex::new(Box::new(callback)),
        });
        self.lock_slots().push(Arc::clone(&slot));
        log::debug!("[Observe] Observer {} registered", id);
        Subscription {
            slot: Some(slot),
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers one change to every observer, in registration order.
    ///
    /// Returns how many callbacks ran.
    pub(crate) fn dispatch(&self, change: &SequencedChange) -> usize {
        // Snapshot so callbacks can subscribe/unsubscribe without deadlocking.
        let slots: Vec<Arc<ObserverSlot>> = self.lock_slots().clone();
        slots.iter().filter(|slot| slot.deliver(change)).count()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, Vec<Arc<ObserverSlot>>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`ObserverRegistry::subscribe`].
///
/// Dropping the handle unsubscribes, so tying it to a screen's lifetime is
/// enough to stop callbacks when the screen is torn down.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    slot: Option<Arc<ObserverSlot>>,
    registry: Weak<RegistryInner>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Identifier of this observer.
    pub fn id(&self) -> Option<ObserverId> {
        self.slot.as_ref().map(|slot| slot.id)
    }

    /// Whether the callback can still be invoked.
    pub fn is_active(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.active.load(Ordering::SeqCst))
    }

    /// Stops all further callback invocations.
    ///
    /// Blocks until a callback running on another thread has returned.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        slot.deactivate();
        if let Some(inner) = self.registry.upgrade() {
            inner
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|other| other.id != slot.id);
        }
        log::debug!("[Observe] Observer {} unregistered", slot.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_change(seq: u64, token: &str) -> SequencedChange {
        SequencedChange {
            seq,
            change: StateChange::TokenChanged(RegistrationToken::new(token)),
        }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let sequence = ChangeSequence::new();
        let registry = ObserverRegistry::new(sequence.clone());
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                registry.subscribe(move |_| order.lock().expect("order").push(i))
            })
            .collect();

        let seq = sequence.advance();
        assert_eq!(registry.dispatch(&token_change(seq, "a")), 3);
        assert_eq!(*order.lock().expect("order"), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn test_changes_before_registration_are_skipped() {
        let sequence = ChangeSequence::new();
        let registry = ObserverRegistry::new(sequence.clone());
        let early = sequence.advance();

        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let _sub = registry.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registry.dispatch(&token_change(early, "old")), 0);
        let late = sequence.advance();
        assert_eq!(registry.dispatch(&token_change(late, "new")), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let sequence = ChangeSequence::new();
        let registry = ObserverRegistry::new(sequence.clone());
        let sub = registry.subscribe(|_| {});
        assert_eq!(registry.len(), 1);
        assert!(sub.is_active());
        drop(sub);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let sequence = ChangeSequence::new();
        let registry = ObserverRegistry::new(sequence.clone());
        let holder: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let hits = Arc::new(AtomicU64::new(0));

        let holder_in_cb = Arc::clone(&holder);
        let counter = Arc::clone(&hits);
        let sub = registry.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = holder_in_cb.lock().expect("holder").take() {
                sub.unsubscribe();
            }
        });
        *holder.lock().expect("holder") = Some(sub);

        registry.dispatch(&token_change(sequence.advance(), "a"));
        registry.dispatch(&token_change(sequence.advance(), "b"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscribe_during_dispatch_sees_only_later_changes() {
        let sequence = ChangeSequence::new();
        let registry = ObserverRegistry::new(sequence.clone());
        let late_hits = Arc::new(AtomicU64::new(0));
        let late_subs: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

        let registry_in_cb = registry.clone();
        let hits = Arc::clone(&late_hits);
        let subs = Arc::clone(&late_subs);
        let _first = registry.subscribe(move |_| {
            let mut subs = subs.lock().expect("subs");
            if subs.is_empty() {
                let hits = Arc::clone(&hits);
                subs.push(registry_in_cb.subscribe(move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                }));
            }
        });

        registry.dispatch(&token_change(sequence.advance(), "a"));
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        registry.dispatch(&token_change(sequence.advance(), "b"));
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_change_kind() {
        let change = StateChange::MessageChanged(NotificationEvent::new(None, None));
        assert_eq!(change.kind(), "message");
        assert_eq!(
            StateChange::TokenChanged(RegistrationToken::new("t")).kind(),
            "token"
        );
    }
}
