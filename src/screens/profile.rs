//! Profile screen - account details and post statistics.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tracing::debug;

use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, ApiError, Operation};
use crate::models::{Post, Session};
use crate::routes::Route;
use crate::services::RequestGeneration;

/// Totals over the user's posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub posts: usize,
    pub likes: u64,
    pub views: u64,
}

impl Stats {
    pub fn of(posts: &[Post]) -> Self {
        Self {
            posts: posts.len(),
            likes: posts.iter().map(|p| p.likes_count).sum(),
            views: posts.iter().map(|p| p.views).sum(),
        }
    }
}

pub struct ProfileScreen {
    ctx: ViewContext,
    session: Option<Session>,
    posts: Vec<Post>,
    list_state: ListState,
    loading: bool,
    error: Option<String>,
    fetches: RequestGeneration,
}

impl ProfileScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            session: None,
            posts: Vec::new(),
            list_state: ListState::default(),
            loading: false,
            error: None,
            fetches: RequestGeneration::new(),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.posts)
    }

    fn fetch(&mut self) {
        self.session = self.ctx.session();
        let Some(session) = &self.session else {
            self.error = Some(user_message(&ApiError::NotLoggedIn, Operation::FetchMyPosts));
            return;
        };

        let ticket = self.fetches.issue();
        let token = session.token.clone();
        let api = self.ctx.api.clone();
        self.loading = true;
        self.error = None;

        self.ctx.spawn(async move {
            let result = api.my_posts(&token).await;
            ViewEvent::PostsLoaded(ticket, result)
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
}

impl Screen for ProfileScreen {
    fn enter(&mut self) {
        self.fetch();
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        let label = Style::default().fg(theme.muted);
        let value = Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD);
        let stats = self.stats();
        let (name, email) = match &self.session {
            Some(s) => (s.name.as_str(), s.email.as_str()),
            None => ("-", "-"),
        };
        let details = vec![
            Line::from(vec![Span::styled("Name:   ", label), Span::styled(name, value)]),
            Line::from(vec![Span::styled("Email:  ", label), Span::styled(email, value)]),
            Line::from(vec![
                Span::styled("Posts: ", label),
                Span::styled(stats.posts.to_string(), value),
                Span::styled("   Total likes: ", label),
                Span::styled(stats.likes.to_string(), value),
                Span::styled("   Total views: ", label),
                Span::styled(stats.views.to_string(), value),
            ]),
        ];
        f.render_widget(
            Paragraph::new(details).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Profile")
                    .border_style(Style::default().fg(theme.accent)),
            ),
            chunks[0],
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Your Posts")
            .border_style(Style::default().fg(theme.accent));

        let placeholder = if let Some(error) = &self.error {
            Some(Line::styled(error.clone(), Style::default().fg(theme.error)))
        } else if self.loading {
            Some(Line::styled("Loading your posts...", label))
        } else if self.posts.is_empty() {
            Some(Line::styled("No posts yet.", label))
        } else {
            None
        };
        if let Some(line) = placeholder {
            f.render_widget(Paragraph::new(line).block(block), chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .posts
            .iter()
            .map(|p| {
                ListItem::new(Line::from(vec![
                    Span::styled(p.title.clone(), Style::default().fg(theme.foreground)),
                    Span::styled(
                        format!("  {} likes, {} views", p.likes_count, p.views),
                        label,
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme.highlight))
            .highlight_symbol("► ");
        f.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
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
            KeyCode::Enter => match self.list_state.selected().and_then(|i| self.posts.get(i)) {
                Some(post) => ScreenAction::Navigate(Route::PostDetails(post.id.clone())),
                None => ScreenAction::None,
            },
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
                self.list_state
                    .select(if self.posts.is_empty() { None } else { Some(0) });
            }
            other => debug!("Profile ignored event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("j/k", "Nav"), ("Enter", "Open"), ("r", "Refresh")]
    }
}
