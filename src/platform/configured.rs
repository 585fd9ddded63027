//! Collaborators whose behaviour comes from configuration.
//!
//! Used when there is no real platform to ask: headless runs, CI and tests.

use anyhow::Result;

use super::{
    NotificationChannel, NotificationPresenter, PermissionRequester, PermissionStatus,
    SystemNotification, TokenSource,
};

/// Permission requester that answers from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPermission {
    required: bool,
    answer: PermissionStatus,
}

impl ConfiguredPermission {
    /// Requester that reports `answer` whenever asked.
    pub fn new(required: bool, answer: PermissionStatus) -> Self {
        Self { required, answer }
    }
}

impl PermissionRequester for ConfiguredPermission {
    fn requires_permission(&self) -> bool {
        self.required
    }

    fn request(&self) -> PermissionStatus {
        self.answer
    }
}

/// Token source backed by a configured token.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredTokenSource {
    token: Option<String>,
}

impl ConfiguredTokenSource {
    /// Source returning `token`, or failing when there is none.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl TokenSource for ConfiguredTokenSource {
    fn fetch(&self) -> Result<String> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => anyhow::bail!("No registration token configured"),
        }
    }
}

/// Presenter that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl NotificationPresenter for LogPresenter {
    fn ensure_channel(&self, _channel: &NotificationChannel) -> Result<()> {
        Ok(())
    }

    fn show(&self, notification: &SystemNotification) -> Result<()> {
        log::info!(
            "[Notify] [{}] {}: {}",
            notification.channel_id,
            notification.title,
            notification.body
        );
        Ok(())
    }
}

/// Presenter that refuses to show anything, as when consent was denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPresenter;

impl NotificationPresenter for DisabledPresenter {
    fn ensure_channel(&self, _channel: &NotificationChannel) -> Result<()> {
        Ok(())
    }

    fn show(&self, _notification: &SystemNotification) -> Result<()> {
        anyhow::bail!("Notification permission denied")
    }
}
