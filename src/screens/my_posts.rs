//! My posts screen - the user's own posts with edit and delete.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableStatefulWidget};
use tracing::debug;

use super::confirm::Confirm;
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, ApiError, Operation};
use crate::models::post::format_date;
use crate::models::Post;
use crate::routes::Route;
use crate::services::RequestGeneration;

/// Lists posts owned by the logged-in user.
pub struct MyPostsScreen {
    ctx: ViewContext,
    posts: Vec<Post>,
    list_state: ListState,
    loading: bool,
    error: Option<String>,
    confirm: Option<Confirm<String>>,
    fetches: RequestGeneration,
}

impl MyPostsScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            posts: Vec::new(),
            list_state: ListState::default(),
            loading: false,
            error: None,
            confirm: None,
            fetches: RequestGeneration::new(),
        }
    }

    #[cfg(test)]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fetch(&mut self) {
        self.error = None;
        let Some(session) = self.ctx.session() else {
            self.error = Some(user_message(&ApiError::NotLoggedIn, Operation::FetchMyPosts));
            return;
        };

        let ticket = self.fetches.issue();
        let api = self.ctx.api.clone();
        self.loading = true;

        self.ctx.spawn(async move {
            let result = api.my_posts(&session.token).await;
            ViewEvent::PostsLoaded(ticket, result)
        });
    }

    fn selected_post(&self) -> Option<&Post> {
        self.list_state.selected().and_then(|i| self.posts.get(i))
    }

    fn request_delete(&mut self) {
        if let Some(post) = self.selected_post() {
            self.confirm = Some(Confirm::new(
                "Are you sure you want to delete this post?",
                post.id.clone(),
            ));
        }
    }

    fn delete(&mut self, id: String) {
        let Some(session) = self.ctx.session() else {
            self.error = Some(user_message(&ApiError::NotLoggedIn, Operation::DeletePost));
            return;
        };
        let api = self.ctx.api.clone();

        self.ctx.spawn(async move {
            let result = api.delete_post(&session.token, &id).await;
            ViewEvent::PostDeleted { id, result }
        });
    }

    fn move_selection(&mut self, down: bool) {
        if self.posts.is_empty() {
            return;
        }
        let last = self.posts.len() - 1;
        let next = match self.list_state.selected() {
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn reselect(&mut self) {
        let selected = match self.list_state.selected() {
            _ if self.posts.is_empty() => None,
            Some(i) => Some(i.min(self.posts.len() - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }
}

impl Screen for MyPostsScreen {
    fn enter(&mut self) {
        self.fetch();
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("My Blogs ({})", self.posts.len()))
            .border_style(Style::default().fg(theme.accent));

        let placeholder = if let Some(error) = &self.error {
            Some(Line::styled(error.clone(), Style::default().fg(theme.error)))
        } else if self.loading {
            Some(Line::styled("Loading your posts...", Style::default().fg(theme.muted)))
        } else if self.posts.is_empty() {
            Some(Line::styled(
                "You haven't written any posts yet.",
                Style::default().fg(theme.muted),
            ))
        } else {
            None
        };

        if let Some(line) = placeholder {
            f.render_widget(Paragraph::new(line).block(block), area);
        } else {
            let format = &self.ctx.config.display.datetime_format;
            let items: Vec<ListItem> = self
                .posts
                .iter()
                .map(|post| {
                    ListItem::new(vec![
                        Line::from(Span::styled(
                            post.title.clone(),
                            Style::default()
                                .fg(theme.foreground)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(
                            format!(
                                "By {} on {}",
                                post.author,
                                format_date(post.date.as_deref(), format)
                            ),
                            Style::default().fg(theme.muted),
                        )),
                        Line::from(Span::styled(
                            format!("{} Likes   {} Views", post.likes_count, post.views),
                            Style::default().fg(theme.muted),
                        )),
                        Line::from(""),
                    ])
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(theme.highlight))
                .highlight_symbol("► ");
            let garnished = GarnishableStatefulWidget::garnish(list, HalfShadow::default());
            f.render_stateful_widget(garnished, area, &mut self.list_state);
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
                        self.delete(confirm.into_payload());
                    }
                }
            }
            return ScreenAction::None;
        }

        match key.code {
            KeyCode::Esc => ScreenAction::Back,
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(false);
                ScreenAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(true);
                ScreenAction::None
            }
            KeyCode::Char('e') => match self.selected_post() {
                Some(post) => ScreenAction::Navigate(Route::EditPost(post.id.clone())),
                None => ScreenAction::None,
            },
            KeyCode::Enter | KeyCode::Char('o') => match self.selected_post() {
                Some(post) => ScreenAction::Navigate(Route::PostDetails(post.id.clone())),
                None => ScreenAction::None,
            },
            KeyCode::Char('d') => {
                self.request_delete();
                ScreenAction::None
            }
            KeyCode::Char('r') => {
                self.fetch();
                ScreenAction::None
            }
            _ => ScreenAction::None,
        }
    }

    fn handle_event(&mut self, event: ViewEvent) -> ScreenAction {
        match event {
            ViewEvent::PostsLoaded(ticket, result) if self.fetches.is_current(ticket) => {
                self.loading = false;
                match result {
                    Ok(posts) => self.posts = posts,
                    Err(e) => {
                        self.error = Some(user_message(&e, Operation::FetchMyPosts));
                        self.posts.clear();
                    }
                }
                self.reselect();
            }
            ViewEvent::PostDeleted { id, result } => match result {
                Ok(()) => {
                    self.posts.retain(|p| p.id != id);
                    self.reselect();
                    return ScreenAction::StatusMessage("Post deleted".to_string());
                }
                Err(e) => {
                    return ScreenAction::StatusMessage(user_message(&e, Operation::DeletePost));
                }
            },
            other => debug!("My posts ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("j/k", "Nav"),
            ("Enter", "Open"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("r", "Refresh"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{key, post, render, Harness};

    #[tokio::test]
    async fn test_unauthorized_shows_message_and_no_posts() {
        let mut h = Harness::logged_in();
        h.api.my_posts.push(Err(ApiError::Unauthorized));

        let mut screen = MyPostsScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        assert_eq!(screen.error(), Some("Unauthorized: Invalid or expired token"));
        assert!(screen.posts().is_empty());
        let text = render(&mut screen, 80, 12);
        assert!(text.contains("Unauthorized: Invalid or expired token"));
        assert!(text.contains("My Blogs (0)"));
    }

    #[tokio::test]
    async fn test_without_session_no_request_is_made() {
        let mut h = Harness::new();
        let mut screen = MyPostsScreen::new(h.ctx.clone());
        screen.enter();

        assert_eq!(screen.error(), Some("User not logged in"));
        assert!(h.api.calls().is_empty());
        h.assert_idle();
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut h = Harness::logged_in();
        h.api
            .my_posts
            .push(Ok(vec![post("1", "One", "x"), post("2", "Two", "y")]));
        let mut screen = MyPostsScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        screen.handle_key(key(KeyCode::Down));
        screen.handle_key(key(KeyCode::Char('d')));
        screen.handle_key(key(KeyCode::Esc));
        h.assert_idle();
        assert_eq!(screen.posts().len(), 2);

        h.api.delete_post.push(Ok(()));
        screen.handle_key(key(KeyCode::Char('d')));
        screen.handle_key(key(KeyCode::Char('y')));
        let action = h.pump(&mut screen).await;

        assert_eq!(action, ScreenAction::StatusMessage("Post deleted".into()));
        let ids: Vec<&str> = screen.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(h.api.calls().last().map(String::as_str), Some("DELETE /posts/2"));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_post() {
        let mut h = Harness::logged_in();
        h.api.my_posts.push(Ok(vec![post("1", "One", "x")]));
        let mut screen = MyPostsScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        h.api.delete_post.push(Err(ApiError::Forbidden));
        screen.handle_key(key(KeyCode::Char('d')));
        screen.handle_key(key(KeyCode::Char('y')));
        let action = h.pump(&mut screen).await;

        assert_eq!(
            action,
            ScreenAction::StatusMessage("You are not allowed to delete this post.".into())
        );
        assert_eq!(screen.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_navigates_to_selected_post() {
        let mut h = Harness::logged_in();
        h.api.my_posts.push(Ok(vec![post("1", "One", "x")]));
        let mut screen = MyPostsScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        assert_eq!(
            screen.handle_key(key(KeyCode::Char('e'))),
            ScreenAction::Navigate(Route::EditPost("1".into()))
        );
    }
}
