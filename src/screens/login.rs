//! Login screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

use super::form::{looks_like_email, Form, FormInput, TextField};
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, Operation};
use crate::models::{Credentials, LoginResponse, Session};
use crate::routes::Route;

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

pub struct LoginScreen {
    ctx: ViewContext,
    form: Form,
    submitting: bool,
    error: Option<String>,
}

impl LoginScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Form::new(vec![
                TextField::new("Email"),
                TextField::new("Password").masked(),
            ]),
            submitting: false,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Result<Credentials, &'static str> {
        let email = self.form.value(EMAIL).trim();
        // Passwords are taken verbatim, so only an empty one counts as missing.
        if email.is_empty() || self.form.value(PASSWORD).is_empty() {
            return Err("Please fill in all fields");
        }
        if !looks_like_email(email) {
            return Err("Please enter a valid email address");
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.form.value(PASSWORD).to_string(),
        })
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let credentials = match self.validate() {
            Ok(c) => c,
            Err(msg) => {
                self.error = Some(msg.to_string());
                return;
            }
        };
        let api = self.ctx.api.clone();
        self.submitting = true;
        self.error = None;

        self.ctx.spawn(async move {
            let result = api.login(&credentials).await;
            ViewEvent::LoggedIn(result)
        });
    }

    fn logged_in(&mut self, response: LoginResponse) -> ScreenAction {
        let Some(session) = Session::from_login(response) else {
            warn!("Login response is missing name, email or token");
            self.error = Some("Login failed".to_string());
            return ScreenAction::None;
        };
        if let Err(e) = self.ctx.session_store.set_session(&session) {
            warn!("Failed to store session: {}", e);
            self.error = Some("Login failed".to_string());
            return ScreenAction::None;
        }
        info!("Logged in as {}", session.email);
        ScreenAction::NavigateWithStatus(Route::Home, format!("Welcome back, {}!", session.name))
    }
}

impl Screen for LoginScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Login")
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        self.form.draw(f, chunks[0], &theme);

        let footer = if let Some(error) = &self.error {
            Line::styled(error.clone(), Style::default().fg(theme.error))
        } else if self.submitting {
            Line::styled("Logging in...", Style::default().fg(theme.muted))
        } else {
            Line::styled(
                "Enter to log in. No account? F10 to sign up.",
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
            ViewEvent::LoggedIn(result) => {
                self.submitting = false;
                match result {
                    Ok(response) => return self.logged_in(response),
                    Err(e) => self.error = Some(user_message(&e, Operation::Login)),
                }
            }
            other => debug!("Login ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Tab", "Next field"), ("Enter", "Log in"), ("Esc", "Back")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::screens::testing::{key, type_text, Harness};

    fn fill(screen: &mut LoginScreen, email: &str, password: &str) {
        type_text(screen, email);
        screen.handle_key(key(KeyCode::Tab));
        type_text(screen, password);
    }

    #[tokio::test]
    async fn test_validation_runs_before_request() {
        let mut h = Harness::new();
        let mut screen = LoginScreen::new(h.ctx.clone());

        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(screen.error(), Some("Please fill in all fields"));

        fill(&mut screen, "ada@example", "secret");
        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(screen.error(), Some("Please enter a valid email address"));

        assert!(h.api.calls().is_empty());
        h.assert_idle();
    }

    #[tokio::test]
    async fn test_whitespace_password_is_sent() {
        let mut h = Harness::new();
        h.api.login.push(Err(ApiError::Rejected {
            status: 401,
            detail: Some("Invalid credentials".into()),
        }));
        let mut screen = LoginScreen::new(h.ctx.clone());

        fill(&mut screen, "ada@example.com", "   ");
        assert_eq!(screen.validate().map(|c| c.password).as_deref(), Ok("   "));
        screen.handle_key(key(KeyCode::Enter));
        h.pump(&mut screen).await;

        assert_eq!(h.api.calls(), vec!["POST /login".to_string()]);
        assert_eq!(screen.error(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_success_stores_session_and_goes_home() {
        let mut h = Harness::new();
        h.api.login.push(Ok(LoginResponse {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            token: "ada-token".into(),
        }));
        let mut screen = LoginScreen::new(h.ctx.clone());

        fill(&mut screen, "ada@example.com", "secret");
        screen.handle_key(key(KeyCode::Enter));
        let action = h.pump(&mut screen).await;

        assert_eq!(
            action,
            ScreenAction::NavigateWithStatus(Route::Home, "Welcome back, Ada!".into())
        );
        let session = h.store.get_session().unwrap();
        assert_eq!(session.token, "ada-token");
    }

    #[tokio::test]
    async fn test_incomplete_response_is_a_failure() {
        let mut h = Harness::new();
        h.api.login.push(Ok(LoginResponse {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            token: String::new(),
        }));
        let mut screen = LoginScreen::new(h.ctx.clone());

        fill(&mut screen, "ada@example.com", "secret");
        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(h.pump(&mut screen).await, ScreenAction::None);

        assert_eq!(screen.error(), Some("Login failed"));
        assert!(!h.store.is_authenticated());
    }

    #[tokio::test]
    async fn test_backend_detail_is_shown() {
        let mut h = Harness::new();
        h.api.login.push(Err(ApiError::Rejected {
            status: 401,
            detail: Some("Invalid credentials".into()),
        }));
        let mut screen = LoginScreen::new(h.ctx.clone());

        fill(&mut screen, "ada@example.com", "wrong");
        screen.handle_key(key(KeyCode::Enter));
        h.pump(&mut screen).await;

        assert_eq!(screen.error(), Some("Invalid credentials"));
    }
}
