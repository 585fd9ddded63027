//! Runtime environment detection.
//!
//! Single source of truth for the runtime environment, read from the
//! `CLOUD_MESSAGING_ENV` environment variable.
//!
//! # Usage
//!
//! ```rust
//! use cloud_messaging::env::Environment;
//!
//! if Environment::current().is_test() {
//!     // Keep files inside the project tmp/ directory
//! }
//! ```
//!
//! # Environment Variable
//!
//! Set `CLOUD_MESSAGING_ENV` to one of:
//! - `test` - Test mode (config and logs under the project `tmp/`)
//! - `development` or `dev` - Development mode (debug logging by default)
//! - (anything else or unset) - Production mode

/// Runtime environment for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment (default).
    Production,
    /// Development environment.
    Development,
    /// Test environment.
    Test,
}

impl Environment {
    /// Detect current environment from `CLOUD_MESSAGING_ENV`.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::var("CLOUD_MESSAGING_ENV").ok().as_deref())
    }

    /// Maps a raw variable value to an environment.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("test") => Self::Test,
            Some("development" | "dev") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Returns `true` if this is the test environment.
    #[must_use]
    pub fn is_test(self) -> bool {
        self == Self::Test
    }

    /// Returns `true` if this is the production environment.
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    /// Returns `true` if this is the development environment.
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// Log filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production | Self::Test => "info",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Convenience function to check if running in test mode.
#[must_use]
pub fn is_test_mode() -> bool {
    Environment::current().is_test()
}
