//! Signup screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info};

use super::form::{looks_like_email, Form, FormInput, TextField};
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, Operation};
use crate::models::SignupRequest;
use crate::routes::Route;

const NAME: usize = 0;
const EMAIL: usize = 1;
const PASSWORD: usize = 2;
const CONFIRM: usize = 3;

const MIN_PASSWORD_CHARS: usize = 6;

pub struct SignupScreen {
    ctx: ViewContext,
    form: Form,
    submitting: bool,
    error: Option<String>,
}

impl SignupScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Form::new(vec![
                TextField::new("Name"),
                TextField::new("Email"),
                TextField::new("Password").masked(),
                TextField::new("Confirm password").masked(),
            ]),
            submitting: false,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Result<SignupRequest, &'static str> {
        let name = self.form.value(NAME).trim();
        let email = self.form.value(EMAIL).trim();
        let password = self.form.value(PASSWORD);
        if name.is_empty()
            || email.is_empty()
            || password.is_empty()
            || self.form.value(CONFIRM).is_empty()
        {
            return Err("Please fill in all fields");
        }
        if !looks_like_email(email) {
            return Err("Please enter a valid email address");
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err("Password must be at least 6 characters");
        }
        if password != self.form.value(CONFIRM) {
            return Err("Passwords do not match");
        }
        Ok(SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let request = match self.validate() {
            Ok(r) => r,
            Err(msg) => {
                self.error = Some(msg.to_string());
                return;
            }
        };
        let api = self.ctx.api.clone();
        self.submitting = true;
        self.error = None;

        self.ctx.spawn(async move {
            let result = api.signup(&request).await;
            ViewEvent::SignedUp(result)
        });
    }
}

impl Screen for SignupScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Sign Up")
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        self.form.draw(f, chunks[0], &theme);

        let footer = if let Some(error) = &self.error {
            Line::styled(error.clone(), Style::default().fg(theme.error))
        } else if self.submitting {
            Line::styled("Creating account...", Style::default().fg(theme.muted))
        } else {
            Line::styled(
                "Enter to sign up. Have an account? F9 to log in.",
                Style::default().fg(theme.muted),
            )
        };
        f.render_widget(Paragraph::new(footer), chunks[1]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        if key.code == KeyCode::Esc {
            return ScreenAction::Back;
        }
        match self.form.handle_key(key) {
            FormInput::Submit => self.submit(),
            FormInput::Changed => self.error = None,
            FormInput::Moved | FormInput::Ignored => {}
        }
        ScreenAction::None
    }

    fn handle_event(&mut self, event: ViewEvent) -> ScreenAction {
        match event {
            ViewEvent::SignedUp(result) => {
                self.submitting = false;
                match result {
                    Ok(()) => {
                        info!("Account created for {}", self.form.value(EMAIL).trim());
                        return ScreenAction::NavigateWithStatus(
                            Route::Login,
                            "Account created. Please log in.".to_string(),
                        );
                    }
                    Err(e) => self.error = Some(user_message(&e, Operation::Signup)),
                }
            }
            other => debug!("Signup ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Tab", "Next field"), ("Enter", "Sign up"), ("Esc", "Back")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::screens::testing::{key, type_text, Harness};

    fn fill(screen: &mut SignupScreen, values: [&str; 4]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                screen.handle_key(key(KeyCode::Tab));
            }
            type_text(screen, value);
        }
    }

    fn rejection(values: [&str; 4]) -> Option<String> {
        let h = Harness::new();
        let mut screen = SignupScreen::new(h.ctx.clone());
        fill(&mut screen, values);
        screen.validate().err().map(str::to_string)
    }

    #[tokio::test]
    async fn test_validation_order() {
        assert_eq!(
            rejection(["Ada", "", "secret", "secret"]).as_deref(),
            Some("Please fill in all fields")
        );
        assert_eq!(
            rejection(["Ada", "ada", "secret", "secret"]).as_deref(),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            rejection(["Ada", "ada@example.com", "abc", "abc"]).as_deref(),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            rejection(["Ada", "ada@example.com", "secret", "secrets"]).as_deref(),
            Some("Passwords do not match")
        );
        assert_eq!(rejection(["Ada", "ada@example.com", "secret", "secret"]), None);
    }

    #[tokio::test]
    async fn test_whitespace_password_is_accepted() {
        assert_eq!(rejection(["Ada", "ada@example.com", "      ", "      "]), None);
        assert_eq!(
            rejection(["   ", "ada@example.com", "secret", "secret"]).as_deref(),
            Some("Please fill in all fields")
        );
        assert_eq!(
            rejection(["Ada", "ada@example.com", "      ", "secret"]).as_deref(),
            Some("Passwords do not match")
        );
    }

    #[tokio::test]
    async fn test_success_goes_to_login() {
        let mut h = Harness::new();
        h.api.signup.push(Ok(()));
        let mut screen = SignupScreen::new(h.ctx.clone());

        fill(&mut screen, ["Ada", "ada@example.com", "secret", "secret"]);
        screen.handle_key(key(KeyCode::Enter));
        let action = h.pump(&mut screen).await;

        assert_eq!(
            action,
            ScreenAction::NavigateWithStatus(Route::Login, "Account created. Please log in.".into())
        );
        assert_eq!(h.api.calls(), vec!["POST /signup".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_shows_detail_or_fallback() {
        let mut h = Harness::new();
        h.api.signup.push(Err(ApiError::Rejected {
            status: 400,
            detail: Some("Email already registered".into()),
        }));
        h.api.signup.push(Err(ApiError::Server { status: 500 }));
        let mut screen = SignupScreen::new(h.ctx.clone());
        fill(&mut screen, ["Ada", "ada@example.com", "secret", "secret"]);

        screen.handle_key(key(KeyCode::Enter));
        h.pump(&mut screen).await;
        assert_eq!(screen.error(), Some("Email already registered"));

        screen.handle_key(key(KeyCode::Enter));
        h.pump(&mut screen).await;
        assert_eq!(screen.error(), Some("Signup failed"));
    }
}
