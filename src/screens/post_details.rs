//! Post details screen - full post, likes and comments.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableStatefulWidget};
use tracing::{debug, warn};

use super::confirm::Confirm;
use super::form::{FormInput, TextField};
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, ApiError, Operation};
use crate::models::post::format_date;
use crate::models::{Comment, NewComment, Post};
use crate::services::RequestGeneration;

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Comments,
    Input,
}

/// Details of one post.
pub struct PostDetailsScreen {
    ctx: ViewContext,
    id: String,

    post: Option<Post>,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,

    comments: Vec<Comment>,
    comment_state: ListState,
    comment_input: TextField,
    comment_loading: bool,

    likes: u64,
    liked_by_user: bool,
    like_loading: bool,

    focus: Focus,
    confirm: Option<Confirm<String>>,
    loads: RequestGeneration,
    like_requests: RequestGeneration,
}

impl PostDetailsScreen {
    pub fn new(ctx: ViewContext, id: String) -> Self {
        Self {
            ctx,
            id,
            post: None,
            loading: true,
            error: None,
            notice: None,
            comments: Vec::new(),
            comment_state: ListState::default(),
            comment_input: TextField::new("Write a comment...").multiline(),
            comment_loading: false,
            likes: 0,
            liked_by_user: false,
            like_loading: false,
            focus: Focus::Comments,
            confirm: None,
            loads: RequestGeneration::new(),
            like_requests: RequestGeneration::new(),
        }
    }

    #[cfg(test)]
    pub fn likes(&self) -> u64 {
        self.likes
    }

    #[cfg(test)]
    pub fn liked_by_user(&self) -> bool {
        self.liked_by_user
    }

    #[cfg(test)]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn load(&mut self) {
        let ticket = self.loads.issue();
        let api = self.ctx.api.clone();
        let id = self.id.clone();
        let token = self.ctx.session().map(|s| s.token);
        self.loading = true;

        self.ctx.spawn(async move {
            let result = api.get_post(&id, token.as_deref()).await;
            ViewEvent::PostLoaded(ticket, result)
        });
    }

    /// Like or unlike the post. Ignored while a toggle is in flight.
    pub fn toggle_like(&mut self) {
        if self.like_loading {
            return;
        }
        let Some(session) = self.ctx.session() else {
            self.notice = Some(user_message(&ApiError::NotLoggedIn, Operation::ToggleLike));
            return;
        };

        let ticket = self.like_requests.issue();
        let api = self.ctx.api.clone();
        let id = self.id.clone();
        self.like_loading = true;

        self.ctx.spawn(async move {
            let result = api.toggle_like(&session.token, &id).await;
            ViewEvent::LikeToggled(ticket, result)
        });
    }

    /// Post the comment typed so far. Blank comments are ignored.
    pub fn submit_comment(&mut self) {
        if self.comment_loading || self.comment_input.is_blank() {
            return;
        }
        let Some(session) = self.ctx.session() else {
            self.notice = Some(user_message(&ApiError::NotLoggedIn, Operation::AddComment));
            return;
        };

        let api = self.ctx.api.clone();
        let id = self.id.clone();
        let comment = NewComment {
            text: self.comment_input.value().to_string(),
        };
        self.comment_loading = true;

        self.ctx.spawn(async move {
            let result = api.add_comment(&session.token, &id, &comment).await;
            ViewEvent::CommentAdded(result)
        });
    }

    fn selected_comment(&self) -> Option<&Comment> {
        self.comment_state
            .selected()
            .and_then(|i| self.comments.get(i))
    }

    /// Ask to delete the selected comment if it belongs to the user.
    pub fn request_delete_comment(&mut self) {
        let Some(session) = self.ctx.session() else {
            self.notice = Some(user_message(&ApiError::NotLoggedIn, Operation::DeleteComment));
            return;
        };
        let Some(comment) = self.selected_comment() else {
            return;
        };
        if comment.author_email != session.email {
            self.notice = Some("You can only delete your own comments.".to_string());
            return;
        }
        self.confirm = Some(Confirm::new(
            "Are you sure you want to delete this comment?",
            comment.id.clone(),
        ));
    }

    fn delete_comment(&mut self, comment_id: String) {
        let Some(session) = self.ctx.session() else {
            self.notice = Some(user_message(&ApiError::NotLoggedIn, Operation::DeleteComment));
            return;
        };
        let api = self.ctx.api.clone();
        let post_id = self.id.clone();

        self.ctx.spawn(async move {
            let result = api
                .delete_comment(&session.token, &post_id, &comment_id)
                .await;
            ViewEvent::CommentDeleted {
                id: comment_id,
                result,
            }
        });
    }

    fn move_selection(&mut self, down: bool) {
        if self.comments.is_empty() {
            return;
        }
        let last = self.comments.len() - 1;
        let next = match self.comment_state.selected() {
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.comment_state.select(Some(next));
    }

    fn apply_post(&mut self, mut post: Post) {
        let email = self.ctx.session().map(|s| s.email);
        self.likes = post.likes_count;
        self.liked_by_user = email.is_some_and(|e| post.is_liked_by(&e));

        let mut comments = std::mem::take(&mut post.comments);
        comments.reverse();
        self.comments = comments;
        self.comment_state
            .select(if self.comments.is_empty() { None } else { Some(0) });
        self.post = Some(post);
    }

    fn comment_items(&self) -> Vec<ListItem<'static>> {
        let theme = &self.ctx.theme;
        let format = &self.ctx.config.display.datetime_format;
        self.comments
            .iter()
            .map(|c| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            c.author_name.clone(),
                            Style::default()
                                .fg(theme.foreground)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", format_date(c.date.as_deref(), format)),
                            Style::default().fg(theme.muted),
                        ),
                    ]),
                    Line::from(Span::styled(
                        c.text.clone(),
                        Style::default().fg(theme.foreground),
                    )),
                ])
            })
            .collect()
    }
}

impl Screen for PostDetailsScreen {
    fn enter(&mut self) {
        self.load();
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();

        let Some(post) = &self.post else {
            let line = match &self.error {
                Some(error) => Line::styled(error.clone(), Style::default().fg(theme.error)),
                None if self.loading => {
                    Line::styled("Loading post...", Style::default().fg(theme.muted))
                }
                None => Line::styled("Post not found.", Style::default().fg(theme.muted)),
            };
            f.render_widget(
                Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
                area,
            );
            return;
        };

        let logged_in = self.ctx.session().is_some();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(if logged_in { 4 } else { 1 }),
            ])
            .split(area);

        let format = &self.ctx.config.display.datetime_format;
        let header = vec![
            Line::from(vec![
                Span::styled("Author: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(if post.author.is_empty() { "Unknown" } else { post.author.as_str() }),
                Span::styled(
                    format!(
                        " ({})",
                        if post.author_email.is_empty() { "N/A" } else { post.author_email.as_str() }
                    ),
                    Style::default().fg(theme.muted),
                ),
            ]),
            Line::styled(
                format!(
                    "{}  ·  {} views  ·  {} likes",
                    format_date(post.date.as_deref(), format),
                    post.views,
                    self.likes
                ),
                Style::default().fg(theme.muted),
            ),
            Line::from(""),
        ];
        let mut body = header;
        body.extend(post.content.lines().map(|l| Line::from(l.to_string())));

        let article = Paragraph::new(body)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(post.title.clone())
                    .border_style(Style::default().fg(theme.accent)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(article, chunks[0]);

        let like_label = if self.liked_by_user { "♥ Liked" } else { "♡ Like" };
        let like_style = if self.liked_by_user {
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        let mut status = vec![Span::styled(like_label, like_style)];
        if let Some(notice) = &self.notice {
            status.push(Span::raw("   "));
            status.push(Span::styled(notice.clone(), Style::default().fg(theme.error)));
        }
        f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

        let comments_block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Comments ({})", self.comments.len()))
            .border_style(if self.focus == Focus::Comments {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.muted)
            });
        if self.comments.is_empty() {
            f.render_widget(
                Paragraph::new(Line::styled("No comments yet.", Style::default().fg(theme.muted)))
                    .block(comments_block),
                chunks[2],
            );
        } else {
            let list = List::new(self.comment_items())
                .block(comments_block)
                .highlight_style(Style::default().bg(theme.highlight))
                .highlight_symbol("► ");
            if self.focus == Focus::Comments {
                let garnished = GarnishableStatefulWidget::garnish(list, HalfShadow::default());
                f.render_stateful_widget(garnished, chunks[2], &mut self.comment_state);
            } else {
                f.render_stateful_widget(list, chunks[2], &mut self.comment_state);
            }
        }

        if logged_in {
            self.comment_input
                .draw(f, chunks[3], &theme, self.focus == Focus::Input);
        } else {
            f.render_widget(
                Paragraph::new(Line::styled(
                    "Log in to like posts and comment.",
                    Style::default().fg(theme.muted),
                )),
                chunks[3],
            );
        }

        if let Some(confirm) = &self.confirm {
            confirm.draw(f, area, &theme);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        if self.confirm.is_some() {
            if let Some(yes) = Confirm::<String>::answer(key) {
                if let Some(confirm) = self.confirm.take() {
                    if yes {
                        self.delete_comment(confirm.into_payload());
                    }
                }
            }
            return ScreenAction::None;
        }

        if key.code == KeyCode::Tab && self.ctx.session().is_some() {
            self.focus = match self.focus {
                Focus::Comments => Focus::Input,
                Focus::Input => Focus::Comments,
            };
            return ScreenAction::None;
        }

        match self.focus {
            Focus::Input => {
                if key.code == KeyCode::Esc {
                    self.focus = Focus::Comments;
                } else if self.comment_input.input(key) == FormInput::Submit {
                    self.submit_comment();
                }
                ScreenAction::None
            }
            Focus::Comments => match key.code {
                KeyCode::Esc => ScreenAction::Back,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection(false);
                    ScreenAction::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection(true);
                    ScreenAction::None
                }
                KeyCode::Char('l') => {
                    self.toggle_like();
                    ScreenAction::None
                }
                KeyCode::Char('d') => {
                    self.request_delete_comment();
                    ScreenAction::None
                }
                KeyCode::Char('r') => {
                    self.load();
                    ScreenAction::None
                }
                _ => ScreenAction::None,
            },
        }
    }

    fn handle_event(&mut self, event: ViewEvent) -> ScreenAction {
        match event {
            ViewEvent::PostLoaded(ticket, result) if self.loads.is_current(ticket) => {
                self.loading = false;
                match result {
                    Ok(post) => {
                        self.error = None;
                        self.apply_post(post);
                    }
                    Err(e) => {
                        warn!("Failed to load post {}: {}", self.id, e);
                        let msg = user_message(&e, Operation::FetchPost);
                        // Keep showing the loaded post; report the failed reload beside it.
                        if self.post.is_some() {
                            self.notice = Some(msg);
                        } else {
                            self.error = Some(msg);
                        }
                    }
                }
            }
            ViewEvent::LikeToggled(ticket, result) if self.like_requests.is_current(ticket) => {
                self.like_loading = false;
                match result {
                    Ok(toggle) => {
                        self.likes = toggle.likes_count;
                        self.liked_by_user = toggle.liked;
                    }
                    Err(e) => self.notice = Some(user_message(&e, Operation::ToggleLike)),
                }
            }
            ViewEvent::CommentAdded(result) => {
                self.comment_loading = false;
                match result {
                    Ok(comment) => {
                        self.comments.insert(0, comment);
                        self.comment_state.select(Some(0));
                        self.comment_input.clear();
                        self.notice = None;
                    }
                    Err(e) => self.notice = Some(user_message(&e, Operation::AddComment)),
                }
            }
            ViewEvent::CommentDeleted { id, result } => match result {
                Ok(()) => {
                    self.comments.retain(|c| c.id != id);
                    if self.comments.is_empty() {
                        self.comment_state.select(None);
                    } else if let Some(i) = self.comment_state.selected() {
                        self.comment_state.select(Some(i.min(self.comments.len() - 1)));
                    }
                }
                Err(e) => self.notice = Some(user_message(&e, Operation::DeleteComment)),
            },
            other => debug!("Post details ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.focus {
            Focus::Comments => &[("l", "Like"), ("Tab", "Comment"), ("d", "Delete"), ("Esc", "Back")],
            Focus::Input => &[("Ctrl+S", "Post"), ("Tab", "Comments")],
        }
    }
}
