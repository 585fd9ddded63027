//! Terminal state guard for RAII cleanup.
//!
//! Entering the guard switches the terminal to raw mode on the alternate
//! screen; dropping it (normally or while unwinding) switches back.

use anyhow::{Context, Result};
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Puts the terminal back the way the shell expects it.
///
/// Errors are ignored; this also runs from the panic hook, where there is
/// nobody left to report them to.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), LeaveAlternateScreen, cursor::Show);
}

/// Guard that restores the terminal on drop (including panics).
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enables raw mode and enters the alternate screen.
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self { _private: () };
        execute!(std::io::stdout(), EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}
