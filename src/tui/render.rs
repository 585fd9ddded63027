//! Demo screen rendering.
//!
//! Pure function of the [`ScreenModel`]: the runner locks the model, hands
//! it here and draws. Layout, top to bottom:
//!
//! ```text
//! ┌ header ──────────────────────────────┐
//! ┌ FCM registration token ──────────────┐
//! │ <token, wrapped>                     │
//! │ [c] Copy token                       │
//! ┌ Last title received ─────────────────┐
//! ┌ Last message received ───────────────┐
//!   footer: toast or key hints
//! ```

// Rust guideline compliant 2026-02

use anyhow::Result;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use super::screen::ScreenModel;
use crate::constants::SCREEN_TITLE;

/// Key hints shown in the footer when no toast is visible.
const KEY_HINTS: &str = "[c] copy token  [q] quit";

/// Draws one frame of the demo screen.
pub fn render<B>(terminal: &mut Terminal<B>, model: &ScreenModel) -> Result<()>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    terminal.draw(|f| render_frame(f, model))?;
    Ok(())
}

/// Lays out and renders the screen into `f`.
pub fn render_frame(f: &mut Frame, model: &ScreenModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            // Room for a full-length token wrapped over three lines.
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(Line::from(Span::styled(
        SCREEN_TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let token_lines = vec![
        Line::from(model.token_text()),
        Line::from(Span::styled(
            "[c] Copy token",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let token_card = Paragraph::new(token_lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("FCM registration token"));
    f.render_widget(token_card, chunks[1]);

    let title_card = Paragraph::new(model.title_text())
        .block(Block::default().borders(Borders::ALL).title("Last title received"));
    f.render_widget(title_card, chunks[2]);

    let body_card = Paragraph::new(model.body_text())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Last message received"));
    f.render_widget(body_card, chunks[3]);

    let footer = match model.toast() {
        Some(toast) => Paragraph::new(Span::styled(
            toast.text(),
            Style::default().add_modifier(Modifier::REVERSED),
        ))
        .alignment(Alignment::Center),
        None => Paragraph::new(KEY_HINTS).alignment(Alignment::Center),
    };
    f.render_widget(footer, chunks[4]);
}
