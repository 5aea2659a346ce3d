//! Edit post screen.

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
use crate::models::{Post, PostUpdate};
use crate::routes::Route;
use crate::services::RequestGeneration;

const TITLE: usize = 0;
const CONTENT: usize = 1;

/// Title and content as loaded, for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Original {
    title: String,
    content: String,
}

pub struct EditPostScreen {
    ctx: ViewContext,
    id: String,
    form: Form,
    original: Option<Original>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    loads: RequestGeneration,
}

impl EditPostScreen {
    pub fn new(ctx: ViewContext, id: impl Into<String>) -> Self {
        Self {
            ctx,
            id: id.into(),
            form: Form::new(vec![
                TextField::new("Title"),
                TextField::new("Content").multiline(),
            ]),
            original: None,
            loading: false,
            saving: false,
            error: None,
            loads: RequestGeneration::new(),
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn load(&mut self) {
        let ticket = self.loads.issue();
        let token = self.ctx.session().map(|s| s.token);
        let api = self.ctx.api.clone();
        let id = self.id.clone();
        self.loading = true;

        self.ctx.spawn(async move {
            let result = api.get_post(&id, token.as_deref()).await;
            ViewEvent::PostLoaded(ticket, result)
        });
    }

    fn apply_post(&mut self, post: Post) {
        self.form.set_value(TITLE, post.title.clone());
        self.form.set_value(CONTENT, post.content.clone());
        self.original = Some(Original {
            title: post.title,
            content: post.content,
        });
    }

    /// Validation message for the current fields, if the update must not be sent.
    fn rejection(&self) -> Option<&'static str> {
        let title = self.form.value(TITLE);
        let content = self.form.value(CONTENT);
        let unchanged = self
            .original
            .as_ref()
            .is_some_and(|o| o.title == title && o.content == content);
        if unchanged {
            Some("No changes detected to update.")
        } else if title.trim().is_empty() || content.trim().is_empty() {
            Some("Title and content cannot be empty.")
        } else {
            None
        }
    }

    fn submit(&mut self) {
        if self.saving || self.loading || self.original.is_none() {
            return;
        }
        if let Some(msg) = self.rejection() {
            self.error = Some(msg.to_string());
            return;
        }
        let Some(session) = self.ctx.session() else {
            self.error = Some(user_message(&ApiError::NotLoggedIn, Operation::UpdatePost));
            return;
        };

        let update = PostUpdate {
            title: self.form.value(TITLE).to_string(),
            content: self.form.value(CONTENT).to_string(),
        };
        let api = self.ctx.api.clone();
        let id = self.id.clone();
        self.saving = true;
        self.error = None;

        self.ctx.spawn(async move {
            let result = api.update_post(&session.token, &id, &update).await;
            ViewEvent::PostUpdated(result)
        });
    }
}

impl Screen for EditPostScreen {
    fn enter(&mut self) {
        self.load();
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Edit Post")
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.loading {
            f.render_widget(
                Paragraph::new(Line::styled("Loading post...", Style::default().fg(theme.muted))),
                inner,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(1)])
            .split(inner);

        if self.original.is_some() {
            self.form.draw(f, chunks[0], &theme);
        }

        let footer = if let Some(error) = &self.error {
            Line::styled(error.clone(), Style::default().fg(theme.error))
        } else if self.saving {
            Line::styled("Updating...", Style::default().fg(theme.muted))
        } else {
            Line::styled("Ctrl+S to update, Esc to cancel", Style::default().fg(theme.muted))
        };
        f.render_widget(Paragraph::new(footer), chunks[1]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        if key.code == KeyCode::Esc {
            return ScreenAction::Back;
        }
        if self.original.is_none() {
            return ScreenAction::None;
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
            ViewEvent::PostLoaded(ticket, result) if self.loads.is_current(ticket) => {
                self.loading = false;
                match result {
                    Ok(post) => self.apply_post(post),
                    Err(e) => self.error = Some(user_message(&e, Operation::LoadPostForEdit)),
                }
            }
            ViewEvent::PostUpdated(result) => {
                self.saving = false;
                match result {
                    Ok(post) => {
                        info!("Updated post {}", post.id);
                        return ScreenAction::NavigateWithStatus(
                            Route::MyPosts,
                            "Post has been updated.".to_string(),
                        );
                    }
                    Err(e) => self.error = Some(user_message(&e, Operation::UpdatePost)),
                }
            }
            other => debug!("Edit post ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Tab", "Next field"), ("Ctrl+S", "Update"), ("Esc", "Cancel")]
    }
}
