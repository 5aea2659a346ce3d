//! Text input fields and forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::services::Theme;

/// What a key did to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    /// The focused field's text changed.
    Changed,
    /// Focus moved to another field.
    Moved,
    /// The user asked to submit.
    Submit,
    /// The key is not for the form.
    Ignored,
}

/// A single editable text value.
#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    value: String,
    masked: bool,
    multiline: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
            multiline: false,
        }
    }

    /// Render the value as bullets.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Enter inserts a newline instead of submitting.
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Apply an editing key. Enter submits single-line fields; Ctrl+S
    /// submits from anywhere.
    pub fn input(&mut self, key: KeyEvent) -> FormInput {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => FormInput::Submit,
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {
                FormInput::Ignored
            }
            KeyCode::Char(c) => {
                self.value.push(c);
                FormInput::Changed
            }
            KeyCode::Backspace => {
                if self.value.pop().is_some() {
                    FormInput::Changed
                } else {
                    FormInput::Ignored
                }
            }
            KeyCode::Enter if self.multiline => {
                self.value.push('\n');
                FormInput::Changed
            }
            KeyCode::Enter => FormInput::Submit,
            _ => FormInput::Ignored,
        }
    }

    fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    fn height(&self) -> Constraint {
        if self.multiline {
            Constraint::Min(5)
        } else {
            Constraint::Length(3)
        }
    }

    /// Draw the field in a titled box, placing the cursor when focused.
    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme, focused: bool) {
        let border = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.label)
            .border_style(border);

        let text = self.display();
        let mut paragraph = Paragraph::new(text.clone())
            .block(block)
            .style(Style::default().fg(theme.foreground));
        if self.multiline {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        f.render_widget(paragraph, area);

        if focused && !self.multiline {
            let col = text.chars().count() as u16;
            let x = area.x + 1 + col.min(area.width.saturating_sub(3));
            f.set_cursor_position((x, area.y + 1));
        }
    }
}

/// An ordered set of fields with one focused.
#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<TextField>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(TextField::value).unwrap_or_default()
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.set_value(value);
        }
    }

    #[cfg(test)]
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// First required field left blank, if any.
    pub fn first_blank(&self) -> Option<&TextField> {
        self.fields.iter().find(|field| field.is_blank())
    }

    fn move_focus(&mut self, forward: bool) -> FormInput {
        let len = self.fields.len();
        if len == 0 {
            return FormInput::Ignored;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
        FormInput::Moved
    }

    /// Route a key to focus movement or the focused field.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            _ => match self.fields.get_mut(self.focus) {
                Some(field) => field.input(key),
                None => FormInput::Ignored,
            },
        }
    }

    /// Lay the fields out top to bottom in `area`.
    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(self.fields.iter().map(TextField::height))
            .split(area);

        for (i, (field, chunk)) in self.fields.iter().zip(chunks.iter()).enumerate() {
            field.draw(f, *chunk, theme, i == self.focus);
        }
    }
}

/// Loose email check: some token of the form `x@y.z` with no whitespace.
pub fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            if c != '@' || at == 0 {
                return false;
            }
            let domain = &token[at + 1..];
            domain
                .char_indices()
                .any(|(dot, d)| d == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{ctrl, key};

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("ada@example.com"));
        assert!(looks_like_email("  a@b.c "));
        assert!(looks_like_email("a@b@c.d"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@.com"));
        assert!(!looks_like_email("ada@example."));
        assert!(!looks_like_email("ada @example.com"));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut field = TextField::new("Title");
        assert_eq!(field.input(key(KeyCode::Char('h'))), FormInput::Changed);
        field.input(key(KeyCode::Char('i')));
        assert_eq!(field.value(), "hi");
        field.input(key(KeyCode::Backspace));
        assert_eq!(field.value(), "h");
        field.input(key(KeyCode::Backspace));
        assert_eq!(field.input(key(KeyCode::Backspace)), FormInput::Ignored);
    }

    #[test]
    fn test_enter_submits_unless_multiline() {
        let mut single = TextField::new("Title");
        assert_eq!(single.input(key(KeyCode::Enter)), FormInput::Submit);

        let mut multi = TextField::new("Content").multiline();
        assert_eq!(multi.input(key(KeyCode::Enter)), FormInput::Changed);
        assert_eq!(multi.value(), "\n");
        assert_eq!(multi.input(ctrl('s')), FormInput::Submit);
    }

    #[test]
    fn test_control_chars_are_not_typed() {
        let mut field = TextField::new("Title");
        assert_eq!(field.input(ctrl('l')), FormInput::Ignored);
        assert!(field.value().is_empty());
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::new(vec![TextField::new("A"), TextField::new("B")]);
        assert_eq!(form.handle_key(key(KeyCode::Tab)), FormInput::Moved);
        assert_eq!(form.focus(), 1);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus(), 0);
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focus(), 1);

        form.handle_key(key(KeyCode::Char('x')));
        assert_eq!(form.value(1), "x");
        assert_eq!(form.first_blank().map(|f| f.label), Some("A"));
    }
}
