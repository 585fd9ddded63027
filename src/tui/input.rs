//! Terminal input handling for the demo screen.
//!
//! ```text
//! crossterm::Event ──► event_to_action() ──► ScreenAction ──► TuiRunner
//! ```

// Rust guideline compliant 2026-02

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    /// Leave the screen.
    Quit,
    /// Copy the current token to the clipboard.
    CopyToken,
}

/// Convert a crossterm event to a screen action.
///
/// Returns `None` for anything without a binding (mouse, resize, release).
#[must_use]
pub fn event_to_action(event: &Event) -> Option<ScreenAction> {
    match event {
        Event::Key(key) => key_event_to_action(key),
        _ => None,
    }
}

/// Key bindings:
/// - `c` - copy token
/// - `q`, `Esc`, `Ctrl+C` - quit
#[must_use]
pub fn key_event_to_action(key: &KeyEvent) -> Option<ScreenAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(ScreenAction::Quit),
        KeyCode::Char('c' | 'C') => Some(ScreenAction::CopyToken),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(ScreenAction::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_key_ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_c_copies_token() {
        assert_eq!(
            key_event_to_action(&make_key(KeyCode::Char('c'))),
            Some(ScreenAction::CopyToken)
        );
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            make_key(KeyCode::Char('q')),
            make_key(KeyCode::Esc),
            make_key_ctrl(KeyCode::Char('c')),
        ] {
            assert_eq!(key_event_to_action(&key), Some(ScreenAction::Quit));
        }
    }

    #[test]
    fn test_unbound_keys_ignored() {
        assert_eq!(key_event_to_action(&make_key(KeyCode::Char('x'))), None);
        assert_eq!(key_event_to_action(&make_key(KeyCode::Enter)), None);
        assert_eq!(event_to_action(&Event::Resize(80, 24)), None);
    }

    #[test]
    fn test_release_events_ignored() {
        let key = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(key_event_to_action(&key), None);
    }
}
