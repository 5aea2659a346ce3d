//! Create post screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info};

use super::form::{Form, FormInput, TextField};
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, ApiError, Operation};
use crate::models::NewPost;
use crate::routes::Route;

const TITLE: usize = 0;
const CONTENT: usize = 1;

pub struct CreatePostScreen {
    ctx: ViewContext,
    form: Form,
    submitting: bool,
    error: Option<String>,
}

impl CreatePostScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Form::new(vec![
                TextField::new("Title"),
                TextField::new("Content").multiline(),
            ]),
            submitting: false,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        if let Some(field) = self.form.first_blank() {
            self.error = Some(format!("{} is required", field.label));
            return;
        }
        let Some(session) = self.ctx.session() else {
            self.error = Some(user_message(&ApiError::NotLoggedIn, Operation::CreatePost));
            return;
        };

        let post = NewPost {
            title: self.form.value(TITLE).to_string(),
            content: self.form.value(CONTENT).to_string(),
            author: session.name.clone(),
            author_email: session.email.clone(),
        };
        let api = self.ctx.api.clone();
        self.submitting = true;
        self.error = None;

        self.ctx.spawn(async move {
            let result = api.create_post(&session.token, &post).await;
            ViewEvent::PostCreated(result)
        });
    }
}

impl Screen for CreatePostScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Create New Post")
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(1)])
            .split(inner);

        self.form.draw(f, chunks[0], &theme);

        let footer = if let Some(error) = &self.error {
            Line::styled(error.clone(), Style::default().fg(theme.error))
        } else if self.submitting {
            Line::styled("Publishing...", Style::default().fg(theme.muted))
        } else {
            Line::styled("Ctrl+S to publish", Style::default().fg(theme.muted))
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
            ViewEvent::PostCreated(result) => {
                self.submitting = false;
                match result {
                    Ok(post) => {
                        info!("Created post {}", post.id);
                        return ScreenAction::NavigateWithStatus(
                            Route::MyPosts,
                            "Post published".to_string(),
                        );
                    }
                    Err(e) => self.error = Some(user_message(&e, Operation::CreatePost)),
                }
            }
            other => debug!("Create post ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Tab", "Next field"), ("Ctrl+S", "Publish"), ("Esc", "Cancel")]
    }
}
