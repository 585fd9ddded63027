//! Terminal-backed collaborators.
//!
//! Desktop terminals understand a few OSC (Operating System Command) escape
//! sequences that pop up native notifications or touch the clipboard:
//!
//! - **OSC 777**: `ESC ] 777 ; notify ; title ; body BEL` (rxvt-unicode style,
//!   also supported by foot, WezTerm, Ghostty)
//! - **OSC 9**: `ESC ] 9 ; message BEL` (iTerm2, Windows Terminal)
//! - **OSC 52**: `ESC ] 52 ; c ; base64 BEL` (clipboard write)
//!
//! Text is stripped of control characters before it is embedded so a message
//! cannot terminate the sequence early or inject its own escapes.

// Rust guideline compliant 2026-02

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{Clipboard, NotificationChannel, NotificationPresenter, SystemNotification};

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Which notification escape the terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscStyle {
    /// OSC 777 with separate title and body.
    #[default]
    Osc777,
    /// OSC 9 with a single message line.
    Osc9,
}

/// Removes characters that would break out of an OSC sequence.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Formats a notification as an OSC escape sequence.
pub fn format_notification(style: OscStyle, title: &str, body: &str) -> String {
    let title = sanitize(title);
    let body = sanitize(body);
    match style {
        // The title is the field before the last separator; keep it single.
        OscStyle::Osc777 => format!("{ESC}]777;notify;{};{body}{BEL}", title.replace(';', ",")),
        OscStyle::Osc9 if body.is_empty() => format!("{ESC}]9;{title}{BEL}"),
        OscStyle::Osc9 => format!("{ESC}]9;{title}: {body}{BEL}"),
    }
}

/// Formats an OSC 52 clipboard write.
pub fn format_clipboard(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("{ESC}]52;c;{encoded}{BEL}")
}

/// Shows notifications by writing OSC escapes to the terminal.
pub struct TerminalPresenter {
    style: OscStyle,
    out: Mutex<Box<dyn Write + Send>>,
    channels: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for TerminalPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPresenter")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl TerminalPresenter {
    /// Presenter writing to stdout.
    pub fn stdout(style: OscStyle) -> Self {
        Self::with_writer(style, Box::new(std::io::stdout()))
    }

    /// Presenter writing to an arbitrary sink.
    pub fn with_writer(style: OscStyle, out: Box<dyn Write + Send>) -> Self {
        Self {
            style,
            out: Mutex::new(out),
            channels: Mutex::new(HashSet::new()),
        }
    }
}

impl NotificationPresenter for TerminalPresenter {
    fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if channels.insert(channel.id.clone()) {
            // Terminals have no channel concept; remember it for the log only.
            log::info!(
                "[Terminal] Notification channel '{}' ({}) ready, importance {:?}",
                channel.id,
                channel.name,
                channel.importance
            );
        }
        Ok(())
    }

    fn show(&self, notification: &SystemNotification) -> Result<()> {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if !channels.contains(&notification.channel_id) {
            anyhow::bail!("Notification channel '{}' does not exist", notification.channel_id);
        }
        drop(channels);

        let sequence = format_notification(self.style, &notification.title, &notification.body);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(sequence.as_bytes())
            .and_then(|()| out.flush())
            .context("Failed to write notification escape to terminal")
    }
}

/// Clipboard backed by the OSC 52 escape sequence.
pub struct Osc52Clipboard {
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Osc52Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Osc52Clipboard").finish_non_exhaustive()
    }
}

impl Osc52Clipboard {
    /// Clipboard writing to stdout.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Clipboard writing to an arbitrary sink.
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Clipboard for Osc52Clipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(format_clipboard(text).as_bytes())
            .and_then(|()| out.flush())
            .context("Failed to write clipboard escape to terminal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Write sink the test can read back.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().expect("buffer").clone()).expect("utf8")
        }
    }

    #[test]
    fn test_format_osc777() {
        assert_eq!(
            format_notification(OscStyle::Osc777, "Hi", "World"),
            "\x1b]777;notify;Hi;World\x07"
        );
    }

    #[test]
    fn test_format_osc9() {
        assert_eq!(format_notification(OscStyle::Osc9, "Hi", "World"), "\x1b]9;Hi: World\x07");
        assert_eq!(format_notification(OscStyle::Osc9, "Hi", ""), "\x1b]9;Hi\x07");
    }

    #[test]
    fn test_format_strips_escape_injection() {
        let seq = format_notification(OscStyle::Osc777, "a\x07b", "c\x1b]0;evil\x07");
        assert_eq!(seq, "\x1b]777;notify;ab;c]0;evil\x07");
    }

    #[test]
    fn test_title_separator_is_neutralised() {
        let seq = format_notification(OscStyle::Osc777, "a;b", "c;d");
        assert_eq!(seq, "\x1b]777;notify;a,b;c;d\x07");
    }

    #[test]
    fn test_format_clipboard() {
        assert_eq!(format_clipboard("abc"), "\x1b]52;c;YWJj\x07");
    }

    #[test]
    fn test_show_requires_channel() {
        let sink = Captured::default();
        let presenter = TerminalPresenter::with_writer(OscStyle::Osc777, Box::new(sink.clone()));
        let notification = SystemNotification::for_message(Some("Hi"), Some("World"));

        assert!(presenter.show(&notification).is_err());
        assert!(sink.text().is_empty());

        presenter
            .ensure_channel(&NotificationChannel::push_messages())
            .expect("channel");
        presenter.show(&notification).expect("show");
        assert_eq!(sink.text(), "\x1b]777;notify;Hi;World\x07");
    }

    #[test]
    fn test_clipboard_writes_osc52() {
        let sink = Captured::default();
        let clipboard = Osc52Clipboard::with_writer(Box::new(sink.clone()));
        clipboard.copy("token").expect("copy");
        assert_eq!(sink.text(), "\x1b]52;c;dG9rZW4=\x07");
    }
}
