//! TUI - the demo screen.
//!
//! A single screen showing the registration token, the last title and the
//! last message. It is an ordinary observer of the notification state:
//! it subscribes on startup, reads the current state once, and unsubscribes
//! when torn down.
//!
//! # Modules
//!
//! - [`guard`] - Terminal state RAII guard for cleanup
//! - [`input`] - Key bindings
//! - [`render`] - Frame layout and drawing
//! - [`runner`] - `TuiRunner` and its event loop
//! - [`screen`] - View model

// Rust guideline compliant 2026-02

pub mod guard;
pub mod input;
pub mod render;
pub mod runner;
pub mod screen;

#[doc(inline)]
pub use guard::{restore_terminal, TerminalGuard};
#[doc(inline)]
pub use input::ScreenAction;
#[doc(inline)]
pub use runner::{RunnerTiming, TuiRunner};
#[doc(inline)]
pub use screen::ScreenModel;
