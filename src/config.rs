//! Configuration loading and persistence.
//!
//! Reads `config.json` from the configuration directory and applies
//! `CLOUD_MESSAGING_*` environment variable overrides on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::constants::{DEFAULT_TICK_RATE, DEFAULT_TOAST_DURATION};
use crate::platform::{OscStyle, PermissionStatus};

/// How system notifications are shown.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenterKind {
    /// OSC escape sequences on the controlling terminal.
    #[default]
    Terminal,
    /// Log lines only.
    Log,
    /// Every attempt fails, as on a device where consent was refused.
    Disabled,
}

impl std::str::FromStr for PresenterKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" => Ok(Self::Terminal),
            "log" => Ok(Self::Log),
            "disabled" => Ok(Self::Disabled),
            other => anyhow::bail!("Unknown presenter '{}'", other),
        }
    }
}

/// Configuration for the cloud-messaging demo.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Token reported at startup, standing in for the backend's token fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_token: Option<String>,
    /// Whether the platform asks the user before showing notifications.
    pub requires_permission: bool,
    /// Answer the permission prompt gives.
    pub permission: PermissionStatus,
    /// How system notifications are shown.
    pub presenter: PresenterKind,
    /// Escape sequence flavour for the terminal presenter.
    pub osc_style: OscStyle,
    /// Delay between UI frames, in milliseconds.
    pub tick_rate_ms: u64,
    /// How long a toast stays visible, in milliseconds.
    pub toast_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_token: None,
            requires_permission: true,
            permission: PermissionStatus::Granted,
            presenter: PresenterKind::Terminal,
            osc_style: OscStyle::Osc777,
            tick_rate_ms: u64::try_from(DEFAULT_TICK_RATE.as_millis()).unwrap_or(50),
            toast_duration_ms: u64::try_from(DEFAULT_TOAST_DURATION.as_millis()).unwrap_or(2000),
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Directory selection priority:
    /// 1. `CLOUD_MESSAGING_CONFIG_DIR` env var: explicit override
    /// 2. `CLOUD_MESSAGING_ENV=test`: `tmp/cloud-messaging-test` in the project
    /// 3. Default: platform config dir (Linux: ~/.config/cloud-messaging)
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(dir) = std::env::var("CLOUD_MESSAGING_CONFIG_DIR") {
            PathBuf::from(dir)
        } else if crate::env::is_test_mode() {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tmp/cloud-messaging-test")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("cloud-messaging")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Path of the config file inside [`Config::config_dir`].
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing file means defaults. A file that exists but does not parse
    /// is an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from an explicit file, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("CLOUD_MESSAGING_TOKEN") {
            self.initial_token = Some(token);
        }

        if let Some(value) = lookup("CLOUD_MESSAGING_PERMISSION") {
            match value.trim().to_ascii_lowercase().as_str() {
                "granted" => self.permission = PermissionStatus::Granted,
                "denied" => self.permission = PermissionStatus::Denied,
                other => log::warn!("Ignoring CLOUD_MESSAGING_PERMISSION={}", other),
            }
        }

        if let Some(value) = lookup("CLOUD_MESSAGING_REQUIRES_PERMISSION") {
            match value.trim() {
                "1" | "true" | "yes" => self.requires_permission = true,
                "0" | "false" | "no" => self.requires_permission = false,
                other => log::warn!("Ignoring CLOUD_MESSAGING_REQUIRES_PERMISSION={}", other),
            }
        }

        if let Some(value) = lookup("CLOUD_MESSAGING_PRESENTER") {
            match value.parse::<PresenterKind>() {
                Ok(kind) => self.presenter = kind,
                Err(e) => log::warn!("Ignoring CLOUD_MESSAGING_PRESENTER: {}", e),
            }
        }

        if let Some(value) = lookup("CLOUD_MESSAGING_TICK_RATE_MS") {
            if let Ok(ms) = value.trim().parse::<u64>() {
                self.tick_rate_ms = ms;
            }
        }
    }

    /// Persists the current configuration to the config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Persists the current configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        // Set restrictive permissions (owner read/write only); the file may hold a token.
        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }

    /// Delay between UI frames. Never zero.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// How long a toast stays visible.
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.initial_token, None);
        assert!(config.requires_permission);
        assert_eq!(config.permission, PermissionStatus::Granted);
        assert_eq!(config.presenter, PresenterKind::Terminal);
        assert_eq!(config.tick_rate(), DEFAULT_TICK_RATE);
        assert_eq!(config.toast_duration(), DEFAULT_TOAST_DURATION);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("CLOUD_MESSAGING_TOKEN", "tok"),
            ("CLOUD_MESSAGING_PERMISSION", "Denied"),
            ("CLOUD_MESSAGING_REQUIRES_PERMISSION", "no"),
            ("CLOUD_MESSAGING_PRESENTER", "log"),
            ("CLOUD_MESSAGING_TICK_RATE_MS", "20"),
        ]));
        assert_eq!(config.initial_token.as_deref(), Some("tok"));
        assert_eq!(config.permission, PermissionStatus::Denied);
        assert!(!config.requires_permission);
        assert_eq!(config.presenter, PresenterKind::Log);
        assert_eq!(config.tick_rate_ms, 20);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("CLOUD_MESSAGING_PERMISSION", "maybe"),
            ("CLOUD_MESSAGING_PRESENTER", "carrier-pigeon"),
            ("CLOUD_MESSAGING_TICK_RATE_MS", "fast"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_zero_tick_rate_is_clamped() {
        let config = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_rate(), Duration::from_millis(1));
    }
}
