//! TuiRunner - the demo screen's event loop.
//!
//! # Architecture
//!
//! ```text
//! TuiRunner (UI thread)
//! ├── terminal: Terminal<B>          - ratatui terminal
//! ├── dispatcher: UiDispatcher       - drained once per frame
//! ├── model: Arc<Mutex<ScreenModel>> - written by the screen's observer
//! └── subscription                   - dropped on teardown
//! ```
//!
//! Each frame pumps the dispatcher (which runs the screen's observer and so
//! updates the model), expires the toast, draws, and then waits up to one
//! tick for a key press.

// Rust guideline compliant 2026-02

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event;
use ratatui::{backend::Backend, Terminal};

use super::input::{event_to_action, ScreenAction};
use super::render::render;
use super::screen::ScreenModel;
use crate::constants::TOKEN_COPIED_TOAST;
use crate::observe::{Subscription, UiDispatcher};
use crate::platform::{Clipboard, TapAction};
use crate::state::NotificationState;

/// Frame timing for the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTiming {
    /// How long to wait for input between frames.
    pub tick_rate: Duration,
    /// How long a toast stays visible.
    pub toast_duration: Duration,
}

/// Drives the demo screen.
///
/// Generic over the ratatui backend: `CrosstermBackend<Stdout>` when running,
/// `TestBackend` under test.
pub struct TuiRunner<B: Backend> {
    terminal: Terminal<B>,
    dispatcher: UiDispatcher,
    model: Arc<Mutex<ScreenModel>>,
    subscription: Option<Subscription>,
    clipboard: Arc<dyn Clipboard>,
    shutdown: Arc<AtomicBool>,
    timing: RunnerTiming,
    quit: bool,
}

impl<B: Backend> std::fmt::Debug for TuiRunner<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TuiRunner")
            .field("timing", &self.timing)
            .field("subscribed", &self.subscription.is_some())
            .field("quit", &self.quit)
            .finish_non_exhaustive()
    }
}

impl<B> TuiRunner<B>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    /// Creates the screen: subscribes for changes, then reads the current
    /// state once.
    pub fn new(
        terminal: Terminal<B>,
        state: &NotificationState,
        dispatcher: UiDispatcher,
        clipboard: Arc<dyn Clipboard>,
        shutdown: Arc<AtomicBool>,
        timing: RunnerTiming,
    ) -> Self {
        let model = Arc::new(Mutex::new(ScreenModel::default()));

        let observer_model = Arc::clone(&model);
        let subscription = dispatcher.registry().subscribe(move |change| {
            observer_model
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(change);
        });
        *lock(&model) = ScreenModel::from_snapshot(&state.snapshot());
        log::info!("[Screen] Subscribed to notification state");

        Self {
            terminal,
            dispatcher,
            model,
            subscription: Some(subscription),
            clipboard,
            shutdown,
            timing,
            quit: false,
        }
    }

    /// Seeds the screen as if it was opened from a notification tap.
    pub fn open_from_tap(&mut self, tap: &TapAction) {
        log::info!("[Screen] Opened from notification tap");
        lock(&self.model).apply_tap(tap);
    }

    /// Copy of what the screen currently shows.
    pub fn model(&self) -> ScreenModel {
        lock(&self.model).clone()
    }

    /// The terminal being drawn to.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Check if the runner should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit || self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the event loop until quit is requested, then tear the screen down.
    pub fn run(&mut self) -> Result<()> {
        log::info!("[Screen] Event loop starting");

        while !self.should_quit() {
            self.tick()?;

            if event::poll(self.timing.tick_rate)? {
                let ev = event::read()?;
                if let Some(action) = event_to_action(&ev) {
                    self.handle_action(action);
                }
            }
        }

        self.close();
        log::info!("[Screen] Event loop exiting");
        Ok(())
    }

    /// One frame without input: dispatch pending changes and draw.
    pub fn tick(&mut self) -> Result<()> {
        let dispatched = self.dispatcher.pump();
        if dispatched > 0 {
            log::debug!("[Screen] {} change(s) applied", dispatched);
        }

        let mut model = lock(&self.model);
        model.expire_toast(Instant::now());
        render(&mut self.terminal, &model)
    }

    /// Performs a key action.
    pub fn handle_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::Quit => self.quit = true,
            ScreenAction::CopyToken => self.copy_token(),
        }
    }

    fn copy_token(&mut self) {
        let mut model = lock(&self.model);
        match self.clipboard.copy(model.token_text()) {
            Ok(()) => {
                log::info!("[Screen] Token copied to clipboard");
                model.show_toast(TOKEN_COPIED_TOAST, Instant::now(), self.timing.toast_duration);
            }
            Err(e) => log::warn!("[Screen] Could not copy token: {:#}", e),
        }
    }

    /// Unsubscribes from the state. Later changes no longer reach the model.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            log::info!("[Screen] Unsubscribed from notification state");
        }
    }
}

fn lock(model: &Mutex<ScreenModel>) -> std::sync::MutexGuard<'_, ScreenModel> {
    model.lock().unwrap_or_else(PoisonError::into_inner)
}
