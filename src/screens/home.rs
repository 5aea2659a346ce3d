//! Home screen - searchable list of all posts.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableStatefulWidget};
use std::time::Duration;
use tracing::debug;

use super::form::{FormInput, TextField};
use super::{Screen, ScreenAction, ViewContext, ViewEvent};
use crate::error::{user_message, Operation};
use crate::models::post::format_date;
use crate::models::Post;
use crate::routes::Route;
use crate::services::RequestGeneration;

/// One rendered entry of the post list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub title: String,
    pub excerpt: String,
    pub byline: String,
}

/// Home screen listing posts with a debounced search box.
pub struct HomeScreen {
    ctx: ViewContext,
    search: TextField,
    posts: Vec<Post>,
    list_state: ListState,
    loading: bool,
    error: Option<String>,
    fetches: RequestGeneration,
    debounce: RequestGeneration,
}

impl HomeScreen {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            search: TextField::new("Search by title or content"),
            posts: Vec::new(),
            list_state: ListState::default(),
            loading: false,
            error: None,
            fetches: RequestGeneration::new(),
            debounce: RequestGeneration::new(),
        }
    }

    /// Fetch posts matching the current search text.
    fn fetch(&mut self) {
        let ticket = self.fetches.issue();
        let query = self.search.value().to_string();
        let api = self.ctx.api.clone();
        self.loading = true;

        debug!("Searching posts for {:?}", query);
        self.ctx.spawn(async move {
            let result = api.list_posts(&query).await;
            ViewEvent::PostsLoaded(ticket, result)
        });
    }

    /// Restart the debounce timer after a search edit.
    fn search_changed(&mut self) {
        let ticket = self.debounce.issue();
        let delay = Duration::from_millis(self.ctx.config.display.search_debounce_ms);
        self.ctx.schedule(delay, ViewEvent::SearchDue(ticket));
    }

    /// Summaries of the loaded posts, in display order.
    pub fn summaries(&self) -> Vec<PostSummary> {
        let display = &self.ctx.config.display;
        self.posts
            .iter()
            .map(|post| PostSummary {
                title: post.title.clone(),
                excerpt: post.excerpt(display.excerpt_chars),
                byline: format!(
                    "By {} on {}",
                    post.author,
                    format_date(post.date.as_deref(), &display.date_format)
                ),
            })
            .collect()
    }

    fn selected_post(&self) -> Option<&Post> {
        self.list_state.selected().and_then(|i| self.posts.get(i))
    }

    fn move_selection(&mut self, down: bool) {
        if self.posts.is_empty() {
            return;
        }
        let last = self.posts.len() - 1;
        let next = match (self.list_state.selected(), down) {
            (Some(i), true) if i < last => i + 1,
            (Some(_), true) => 0,
            (Some(0), false) | (None, false) => last,
            (Some(i), false) => i - 1,
            (None, true) => 0,
        };
        self.list_state.select(Some(next));
    }
}

impl Screen for HomeScreen {
    fn enter(&mut self) {
        self.fetch();
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let theme = self.ctx.theme.clone();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.search.draw(f, chunks[0], &theme, true);

        let placeholder = if self.loading {
            Some(Line::styled("Loading posts...", Style::default().fg(theme.muted)))
        } else if let Some(error) = &self.error {
            Some(Line::styled(error.clone(), Style::default().fg(theme.error)))
        } else if self.posts.is_empty() {
            Some(Line::styled("No posts found.", Style::default().fg(theme.muted)))
        } else {
            None
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Blog Posts ({})", self.posts.len()))
            .border_style(Style::default().fg(theme.accent));

        if let Some(line) = placeholder {
            f.render_widget(Paragraph::new(line).block(block), chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .summaries()
            .into_iter()
            .map(|s| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        s.title,
                        Style::default()
                            .fg(theme.foreground)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(s.excerpt, Style::default().fg(theme.foreground))),
                    Line::from(Span::styled(s.byline, Style::default().fg(theme.muted))),
                    Line::from(""),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme.highlight))
            .highlight_symbol("► ");
        let garnished = GarnishableStatefulWidget::garnish(list, HalfShadow::default());
        f.render_stateful_widget(garnished, chunks[1], &mut self.list_state);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Esc => ScreenAction::Back,
            KeyCode::Up => {
                self.move_selection(false);
                ScreenAction::None
            }
            KeyCode::Down => {
                self.move_selection(true);
                ScreenAction::None
            }
            KeyCode::Enter => match self.selected_post() {
                Some(post) => ScreenAction::Navigate(Route::PostDetails(post.id.clone())),
                None => ScreenAction::None,
            },
            _ => {
                if self.search.input(key) == FormInput::Changed {
                    self.search_changed();
                }
                ScreenAction::None
            }
        }
    }

    fn handle_event(&mut self, event: ViewEvent) -> ScreenAction {
        match event {
            ViewEvent::SearchDue(ticket) if self.debounce.is_current(ticket) => self.fetch(),
            ViewEvent::PostsLoaded(ticket, result) if self.fetches.is_current(ticket) => {
                self.loading = false;
                match result {
                    Ok(posts) => {
                        self.error = None;
                        self.posts = posts;
                    }
                    Err(e) => {
                        self.error = Some(user_message(&e, Operation::ListPosts));
                        self.posts.clear();
                    }
                }
                self.list_state
                    .select(if self.posts.is_empty() { None } else { Some(0) });
            }
            other => debug!("Home ignored stale or foreign event: {:?}", other),
        }
        ScreenAction::None
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("type", "Search"), ("↑/↓", "Nav"), ("Enter", "Read")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::screens::testing::{key, post, render, type_text, Harness};

    #[tokio::test]
    async fn test_renders_one_summary_per_post() {
        let mut h = Harness::new();
        let long = "a".repeat(180);
        h.api.list_posts.push(Ok(vec![
            post("1", "First", &long),
            post("2", "Second", "tiny"),
            post("3", "Third", &"b".repeat(100)),
        ]));

        let mut screen = HomeScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        let summaries = screen.summaries();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].excerpt, format!("{}...", "a".repeat(100)));
        assert_eq!(summaries[1].excerpt, "tiny...");
        assert_eq!(summaries[2].excerpt, format!("{}...", "b".repeat(100)));
        assert_eq!(summaries[0].byline, "By Ada on 01/05/2024");
        assert_eq!(h.api.calls(), vec!["GET /posts/?search=".to_string()]);

        let screen_text = render(&mut screen, 120, 30);
        assert!(screen_text.contains("Blog Posts (3)"));
        assert!(screen_text.contains("Second"));
    }

    #[tokio::test]
    async fn test_debounce_issues_one_request_for_burst() {
        let mut h = Harness::new();
        h.api.list_posts.push(Ok(vec![post("9", "Rust", "ownership")]));
        let mut screen = HomeScreen::new(h.ctx.clone());

        type_text(&mut screen, "ru");
        // Two timers fire; only the second is current.
        h.pump(&mut screen).await;
        h.pump(&mut screen).await;
        h.pump(&mut screen).await;

        assert_eq!(h.api.calls(), vec!["GET /posts/?search=ru".to_string()]);
        assert_eq!(screen.summaries().len(), 1);
        h.assert_idle();
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mut h = Harness::new();
        h.api.list_posts.push(Ok(vec![post("1", "Old", "x")]));
        h.api.list_posts.push(Ok(vec![post("2", "New", "y"), post("3", "New", "z")]));
        let mut screen = HomeScreen::new(h.ctx.clone());

        screen.fetch();
        screen.fetch();
        let first = h.next_event().await;
        let second = h.next_event().await;

        // Deliver the newer response first, then the stale one.
        let first_is_newer = matches!(
            (&first, &second),
            (ViewEvent::PostsLoaded(a, _), ViewEvent::PostsLoaded(b, _)) if a > b
        );
        let (newer, older) = if first_is_newer {
            (first, second)
        } else {
            (second, first)
        };
        screen.handle_event(newer);
        screen.handle_event(older);

        let titles: Vec<String> = screen.summaries().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["New".to_string(), "New".to_string()]);
    }

    #[tokio::test]
    async fn test_error_and_empty_states() {
        let mut h = Harness::new();
        h.api.list_posts.push(Err(ApiError::Network("down".into())));
        let mut screen = HomeScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        assert!(screen.summaries().is_empty());
        assert!(render(&mut screen, 80, 12).contains("Error connecting to server"));

        h.api.list_posts.push(Ok(vec![]));
        screen.fetch();
        h.pump(&mut screen).await;
        assert!(render(&mut screen, 80, 12).contains("No posts found."));
    }

    #[tokio::test]
    async fn test_enter_opens_selected_post() {
        let mut h = Harness::new();
        h.api.list_posts.push(Ok(vec![post("1", "A", "x"), post("2", "B", "y")]));
        let mut screen = HomeScreen::new(h.ctx.clone());
        screen.enter();
        h.pump(&mut screen).await;

        screen.handle_key(key(KeyCode::Down));
        assert_eq!(
            screen.handle_key(key(KeyCode::Enter)),
            ScreenAction::Navigate(Route::PostDetails("2".into()))
        );
    }
}
