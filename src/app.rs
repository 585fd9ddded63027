//! Application wiring.
//!
//! Builds the shared state, the UI dispatcher and the delivery callback from
//! the configuration, performs the startup steps (permission prompt, token
//! fetch), and hands the dispatcher to either the demo screen or the
//! headless pump loop.

// Rust guideline compliant 2026-02

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use ratatui::{backend::Backend, Terminal};

use crate::config::{Config, PresenterKind};
use crate::constants::HEADLESS_PUMP_INTERVAL;
use crate::delivery::DeliveryCallback;
use crate::observe::{StateChange, UiDispatcher};
use crate::platform::{
    Clipboard, ConfiguredPermission, ConfiguredTokenSource, DisabledPresenter, LogPresenter,
    NotificationPresenter, Osc52Clipboard, PermissionRequester, TerminalPresenter, TokenSource,
};
use crate::state::{NotificationState, RegistrationToken, SharedNotificationState};
use crate::transport::FeedHandle;
use crate::tui::{RunnerTiming, TuiRunner};

/// The platform collaborators the app talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Shows system notifications.
    pub presenter: Arc<dyn NotificationPresenter>,
    /// Asks for notification consent.
    pub permission: Arc<dyn PermissionRequester>,
    /// Fetches the token at startup.
    pub token_source: Arc<dyn TokenSource>,
    /// Copies the token for the user.
    pub clipboard: Arc<dyn Clipboard>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Collaborators selected by `config`.
    pub fn from_config(config: &Config) -> Self {
        let presenter: Arc<dyn NotificationPresenter> = match config.presenter {
            PresenterKind::Terminal => Arc::new(TerminalPresenter::stdout(config.osc_style)),
            PresenterKind::Log => Arc::new(LogPresenter),
            PresenterKind::Disabled => Arc::new(DisabledPresenter),
        };
        Self {
            presenter,
            permission: Arc::new(ConfiguredPermission::new(
                config.requires_permission,
                config.permission,
            )),
            token_source: Arc::new(ConfiguredTokenSource::new(config.initial_token.clone())),
            clipboard: Arc::new(Osc52Clipboard::stdout()),
        }
    }
}

/// State, dispatcher and delivery callback for one run.
#[derive(Debug)]
pub struct App {
    state: SharedNotificationState,
    dispatcher: UiDispatcher,
    delivery: DeliveryCallback,
    collaborators: Collaborators,
    timing: RunnerTiming,
}

impl App {
    /// Builds an app with empty state.
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let (notifier, dispatcher) = UiDispatcher::channel();
        let state = NotificationState::shared(notifier);
        let delivery = DeliveryCallback::new(Arc::clone(&state), Arc::clone(&collaborators.presenter));
        Self {
            state,
            dispatcher,
            delivery,
            collaborators,
            timing: RunnerTiming {
                tick_rate: config.tick_rate(),
                toast_duration: config.toast_duration(),
            },
        }
    }

    /// The shared notification state.
    pub fn state(&self) -> &SharedNotificationState {
        &self.state
    }

    /// A delivery callback for a transport to call into.
    pub fn delivery(&self) -> DeliveryCallback {
        self.delivery.clone()
    }

    /// The dispatcher the UI thread pumps.
    pub fn dispatcher_mut(&mut self) -> &mut UiDispatcher {
        &mut self.dispatcher
    }

    /// Startup steps: ask for notification permission if the platform needs
    /// it, then fetch the initial token.
    ///
    /// Neither step can fail the app. A denied permission is logged only; a
    /// failed token fetch leaves the token empty and is not retried.
    pub fn start(&self) {
        let permission = &self.collaborators.permission;
        if permission.requires_permission() {
            let status = permission.request();
            log::info!("[Startup] Notification permission {}", status);
        }

        match self.collaborators.token_source.fetch() {
            Ok(token) => {
                let token = RegistrationToken::new(token);
                log::info!("[Startup] FCM token: {:?}", token);
                self.state.set_token(token);
            }
            Err(e) => log::warn!("[Startup] Fetching FCM registration token failed: {:#}", e),
        }
    }

    /// Moves the dispatcher into a demo screen drawing on `terminal`.
    pub fn into_runner<B>(self, terminal: Terminal<B>, shutdown: Arc<AtomicBool>) -> TuiRunner<B>
    where
        B: Backend,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        TuiRunner::new(
            terminal,
            &self.state,
            self.dispatcher,
            self.collaborators.clipboard,
            shutdown,
            self.timing,
        )
    }

    /// Pumps the dispatcher without a screen, with a log observer attached.
    ///
    /// Returns when `shutdown` is set, or when `feed` has ended and every
    /// change it produced has been dispatched. Without a feed only `shutdown`
    /// ends the loop.
    pub fn run_headless(&mut self, feed: Option<&FeedHandle>, shutdown: &AtomicBool) -> Result<()> {
        let observer = self.dispatcher.registry().subscribe(log_change);
        // Values stored before the observer existed are never replayed to it.
        let snapshot = self.state.snapshot();
        if let Some(token) = snapshot.token {
            log_change(&StateChange::TokenChanged(token));
        }
        if let Some(message) = snapshot.message {
            log_change(&StateChange::MessageChanged(message));
        }

        while !shutdown.load(Ordering::Relaxed) {
            // Checked before pumping so nothing the feed queued is left behind.
            let feed_done = feed.is_some_and(FeedHandle::is_finished);
            let dispatched = self.dispatcher.pump();
            if dispatched == 0 {
                if feed_done {
                    log::info!("[Headless] Feed ended and queue drained");
                    break;
                }
                std::thread::sleep(HEADLESS_PUMP_INTERVAL);
            }
        }

        observer.unsubscribe();
        Ok(())
    }
}

fn log_change(change: &StateChange) {
    match change {
        StateChange::TokenChanged(token) => {
            log::info!("[Headless] Token changed: {:?}", token);
            println!("token: {}", token);
        }
        StateChange::MessageChanged(event) => {
            log::info!(
                "[Headless] Message changed: title={:?} body={:?}",
                event.title(),
                event.body()
            );
            println!(
                "message: {} | {}",
                event.title().unwrap_or_default(),
                event.body().unwrap_or_default()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PermissionStatus;
    use std::sync::atomic::AtomicUsize;

    struct CountingPermission {
        required: bool,
        asked: AtomicUsize,
    }

    impl PermissionRequester for CountingPermission {
        fn requires_permission(&self) -> bool {
            self.required
        }

        fn request(&self) -> PermissionStatus {
            self.asked.fetch_add(1, Ordering::SeqCst);
            PermissionStatus::Denied
        }
    }

    fn collaborators(token: Option<&str>, permission: Arc<CountingPermission>) -> Collaborators {
        Collaborators {
            presenter: Arc::new(LogPresenter),
            permission,
            token_source: Arc::new(ConfiguredTokenSource::new(token.map(str::to_string))),
            clipboard: Arc::new(Osc52Clipboard::with_writer(Box::new(std::io::sink()))),
        }
    }

    fn permission(required: bool) -> Arc<CountingPermission> {
        Arc::new(CountingPermission {
            required,
            asked: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_start_fetches_token() {
        let app = App::new(&Config::default(), collaborators(Some("tok"), permission(false)));
        app.start();
        assert_eq!(app.state().current_token(), Some(RegistrationToken::new("tok")));
    }

    #[test]
    fn test_start_without_token_leaves_it_empty() {
        let app = App::new(&Config::default(), collaborators(None, permission(false)));
        app.start();
        assert_eq!(app.state().current_token(), None);
    }

    #[test]
    fn test_permission_asked_only_when_required() {
        let asked = permission(true);
        let app = App::new(&Config::default(), collaborators(None, Arc::clone(&asked)));
        app.start();
        assert_eq!(asked.asked.load(Ordering::SeqCst), 1);

        let not_asked = permission(false);
        let app = App::new(&Config::default(), collaborators(None, Arc::clone(&not_asked)));
        app.start();
        assert_eq!(not_asked.asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_headless_stops_on_shutdown() {
        let mut app = App::new(&Config::default(), collaborators(None, permission(false)));
        let shutdown = AtomicBool::new(true);
        app.run_headless(None, &shutdown).expect("headless");
        assert!(app.dispatcher_mut().registry().is_empty());
    }
}
