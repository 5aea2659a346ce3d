//! TUI screens, one per route.

pub mod confirm;
pub mod create_post;
pub mod edit_post;
pub mod form;
pub mod home;
pub mod login;
pub mod my_posts;
pub mod post_details;
pub mod profile;
pub mod signup;

pub use create_post::CreatePostScreen;
pub use edit_post::EditPostScreen;
pub use home::HomeScreen;
pub use login::LoginScreen;
pub use my_posts::MyPostsScreen;
pub use post_details::PostDetailsScreen;
pub use profile::ProfileScreen;
pub use signup::SignupScreen;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Comment, LikeToggle, LoginResponse, Post, Session};
use crate::routes::Route;
use crate::services::{BlogApi, SessionStore, Theme, Ticket};

/// Action returned by screen handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAction {
    /// No action needed.
    None,
    /// Display a status message.
    StatusMessage(String),
    /// Go to another route (through the auth gate).
    Navigate(Route),
    /// Go to another route and display a status message there.
    NavigateWithStatus(Route, String),
    /// Return to the previous route.
    Back,
}

/// Completion of background work started by a screen.
#[derive(Debug)]
pub enum ViewEvent {
    /// The search debounce timer for `Ticket` fired.
    SearchDue(Ticket),
    PostsLoaded(Ticket, Result<Vec<Post>, ApiError>),
    PostLoaded(Ticket, Result<Post, ApiError>),
    SignedUp(Result<(), ApiError>),
    LoggedIn(Result<LoginResponse, ApiError>),
    PostCreated(Result<Post, ApiError>),
    PostUpdated(Result<Post, ApiError>),
    PostDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    LikeToggled(Ticket, Result<LikeToggle, ApiError>),
    CommentAdded(Result<Comment, ApiError>),
    CommentDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
}

/// A [`ViewEvent`] tagged with the epoch of the screen that started it.
#[derive(Debug)]
pub struct AppEvent {
    pub epoch: u64,
    pub event: ViewEvent,
}

/// Services and the event channel handed to each screen.
#[derive(Clone)]
pub struct ViewContext {
    pub api: Arc<dyn BlogApi>,
    pub session_store: Arc<SessionStore>,
    pub config: Arc<Config>,
    pub theme: Arc<Theme>,
    epoch: u64,
    events: UnboundedSender<AppEvent>,
}

impl ViewContext {
    pub fn new(
        api: Arc<dyn BlogApi>,
        session_store: Arc<SessionStore>,
        config: Arc<Config>,
        theme: Arc<Theme>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            api,
            session_store,
            config,
            theme,
            epoch: 0,
            events,
        }
    }

    /// Copy of this context whose events are tagged with `epoch`.
    pub fn with_epoch(&self, epoch: u64) -> Self {
        Self {
            epoch,
            ..self.clone()
        }
    }

    /// The current session, read fresh from the store.
    pub fn session(&self) -> Option<Session> {
        self.session_store.get_session()
    }

    /// Run `task` in the background and deliver its event to this screen.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ViewEvent> + Send + 'static,
    {
        let events = self.events.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let event = task.await;
            let _ = events.send(AppEvent { epoch, event });
        });
    }

    /// Deliver `event` to this screen after `delay`.
    pub fn schedule(&self, delay: Duration, event: ViewEvent) {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            event
        });
    }
}

/// Trait for screen implementations.
pub trait Screen {
    /// Start the screen's initial loads. Called once after construction.
    fn enter(&mut self) {}

    /// Draw the screen.
    fn draw(&mut self, f: &mut Frame, area: Rect);

    /// Handle a key event.
    fn handle_key(&mut self, key: KeyEvent) -> ScreenAction;

    /// Handle completion of background work.
    fn handle_event(&mut self, event: ViewEvent) -> ScreenAction;

    /// Key hints for the status bar.
    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Esc", "Back")]
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::services::api::mock::MockBlogApi;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    /// Mock services plus the receiving end of the event channel.
    pub struct Harness {
        pub api: Arc<MockBlogApi>,
        pub store: Arc<SessionStore>,
        pub ctx: ViewContext,
        rx: UnboundedReceiver<AppEvent>,
    }

    impl Harness {
        pub fn new() -> Self {
            let api = Arc::new(MockBlogApi::new());
            let store = Arc::new(SessionStore::in_memory().unwrap());
            let mut config = Config::default();
            config.display.search_debounce_ms = 10;
            let (tx, rx) = unbounded_channel();
            let ctx = ViewContext::new(
                api.clone(),
                store.clone(),
                Arc::new(config),
                Arc::new(Theme::default()),
                tx,
            );
            Self {
                api,
                store,
                ctx,
                rx,
            }
        }

        pub fn logged_in() -> Self {
            let harness = Self::new();
            harness.store.set_session(&ada()).unwrap();
            harness
        }

        pub async fn next_event(&mut self) -> ViewEvent {
            tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
                .await
                .expect("timed out waiting for a view event")
                .expect("event channel closed")
                .event
        }

        /// Deliver the next background result to `screen`.
        pub async fn pump<S: Screen + ?Sized>(&mut self, screen: &mut S) -> ScreenAction {
            let event = self.next_event().await;
            screen.handle_event(event)
        }

        pub fn assert_idle(&mut self) {
            assert!(self.rx.try_recv().is_err(), "unexpected pending event");
        }
    }

    pub fn ada() -> Session {
        Session::new("Ada", "ada@example.com", "ada-token").unwrap()
    }

    pub fn post(id: &str, title: &str, content: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "content": content,
            "author": "Ada",
            "author_email": "ada@example.com",
            "date": "2024-05-01T10:30:00",
        }))
        .unwrap()
    }

    pub fn comment(id: &str, text: &str, email: &str) -> Comment {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "text": text,
            "author_name": email.split('@').next().unwrap_or_default(),
            "author_email": email,
        }))
        .unwrap()
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn type_text<S: Screen + ?Sized>(screen: &mut S, text: &str) {
        for c in text.chars() {
            screen.handle_key(key(KeyCode::Char(c)));
        }
    }

    /// Render `screen` into an off-screen buffer and return its text.
    pub fn render<S: Screen + ?Sized>(screen: &mut S, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| screen.draw(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for row in buffer.content.chunks(buffer.area.width as usize) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }
}
