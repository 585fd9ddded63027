//! Marshalling of state changes onto the UI thread.
//!
//! [`ChangeNotifier`] is the writer half: it lives inside the state and may be
//! used from any thread. [`UiDispatcher`] is the reader half: it is owned by
//! the UI loop, which calls [`UiDispatcher::pump`] once per frame.

// Rust guideline compliant 2026-02

use tokio::sync::mpsc;

use super::{ChangeSequence, ObserverRegistry, SequencedChange, StateChange};

/// Upper bound on changes dispatched by a single `pump` call.
///
/// Keeps a burst of writes from starving input handling and rendering; the
/// remainder is picked up on the next frame.
const MAX_CHANGES_PER_PUMP: usize = 256;

/// Writer half of the change channel.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    sequence: ChangeSequence,
    tx: mpsc::UnboundedSender<SequencedChange>,
}

impl ChangeNotifier {
    /// Reserves the sequence number for a write that is about to happen.
    pub(crate) fn next_seq(&self) -> u64 {
        self.sequence.advance()
    }

    /// Queues a change for the UI thread.
    ///
    /// Never blocks. If the UI side has shut down the change is dropped; the
    /// state itself has already been updated.
    pub(crate) fn publish(&self, seq: u64, change: StateChange) {
        let kind = change.kind();
        if self.tx.send(SequencedChange { seq, change }).is_err() {
            log::debug!("[Dispatch] UI dispatcher gone, {} change #{} not queued", kind, seq);
        }
    }
}

/// Reader half of the change channel, owned by the UI thread.
#[derive(Debug)]
pub struct UiDispatcher {
    rx: mpsc::UnboundedReceiver<SequencedChange>,
    registry: ObserverRegistry,
}

impl UiDispatcher {
    /// Creates a connected notifier/dispatcher pair with an empty registry.
    pub fn channel() -> (ChangeNotifier, Self) {
        let sequence = ChangeSequence::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = ObserverRegistry::new(sequence.clone());
        (ChangeNotifier { sequence, tx }, Self { rx, registry })
    }

    /// Registry observers subscribe through.
    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    /// Drains queued changes and invokes observers.
    ///
    /// Must be called from the UI thread. Returns the number of changes
    /// taken off the queue.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        while drained < MAX_CHANGES_PER_PUMP {
            match self.rx.try_recv() {
                Ok(change) => {
                    let delivered = self.registry.dispatch(&change);
                    log::trace!(
                        "[Dispatch] {} change #{} delivered to {} observer(s)",
                        change.change.kind(),
                        change.seq,
                        delivered
                    );
                    drained += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    log::debug!("[Dispatch] All notifiers dropped");
                    break;
                }
            }
        }
        drained
    }

    /// Whether every writer has been dropped and the queue is empty.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }
}
