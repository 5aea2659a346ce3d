//! Modal yes/no prompt for destructive actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableWidget, Padding};

use crate::services::Theme;

/// A pending question carrying the value it is about.
#[derive(Debug, Clone)]
pub struct Confirm<T> {
    prompt: String,
    payload: T,
}

impl<T> Confirm<T> {
    pub fn new(prompt: impl Into<String>, payload: T) -> Self {
        Self {
            prompt: prompt.into(),
            payload,
        }
    }

    /// `Some(true)` on y, `Some(false)` on n or Esc, `None` otherwise.
    pub fn answer(key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            _ => None,
        }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Draw centered over `area`.
    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let rect = centered(area, 50, 7);
        f.render_widget(Clear, rect);

        let text = vec![
            Line::from(self.prompt.as_str()),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
                Span::raw(" confirm   "),
                Span::styled("n", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ]),
        ];
        let dialog = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm")
                    .border_style(Style::default().fg(theme.error)),
            )
            .wrap(Wrap { trim: true })
            .garnish(Padding::horizontal(1))
            .garnish(HalfShadow::default());
        f.render_widget(dialog, rect);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1])[1]
}
