//! Main application state and event loop.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::gate::{AuthGate, GateDecision};
use crate::routes::Route;
use crate::screens::{
    AppEvent, CreatePostScreen, EditPostScreen, HomeScreen, LoginScreen, MyPostsScreen,
    PostDetailsScreen, ProfileScreen, Screen, ScreenAction, SignupScreen, ViewContext,
};
use crate::services::{BlogApi, HttpBlogApi, LocalStorage, SessionStore, Theme};

const MAX_HISTORY: usize = 64;

/// Application state.
pub struct App {
    ctx: ViewContext,
    gate: AuthGate,
    route: Route,
    history: Vec<Route>,
    screen: Box<dyn Screen>,
    /// Incremented on every screen change; events from older screens are dropped
    epoch: u64,
    events: UnboundedReceiver<AppEvent>,
    should_quit: bool,

    // Status bar info
    status_message: String,
}

/// One entry of the navigation bar.
struct NavItem {
    key: &'static str,
    label: String,
    route: Option<Route>,
}

fn screen_for(route: &Route, ctx: ViewContext) -> Box<dyn Screen> {
    match route {
        Route::Home => Box::new(HomeScreen::new(ctx)),
        Route::Login => Box::new(LoginScreen::new(ctx)),
        Route::Signup => Box::new(SignupScreen::new(ctx)),
        Route::CreatePost => Box::new(CreatePostScreen::new(ctx)),
        Route::MyPosts => Box::new(MyPostsScreen::new(ctx)),
        Route::EditPost(id) => Box::new(EditPostScreen::new(ctx, id.clone())),
        Route::Profile => Box::new(ProfileScreen::new(ctx)),
        Route::PostDetails(id) => Box::new(PostDetailsScreen::new(ctx, id.clone())),
    }
}

impl App {
    /// Create a new application instance backed by the HTTP API and the
    /// on-disk session store.
    pub fn new(config: Config, start: Route) -> Result<Self> {
        let storage_path = config.storage_path();
        info!("Using local storage at {}", storage_path.display());
        let session_store = Arc::new(SessionStore::new(LocalStorage::open(&storage_path)?));
        let api: Arc<dyn BlogApi> = Arc::new(HttpBlogApi::new(&config.api)?);
        let theme = Arc::new(Theme::from_config(&config.theme));

        Ok(Self::with_services(
            api,
            session_store,
            Arc::new(config),
            theme,
            start,
        ))
    }

    /// Create an application over the given services and show `start`.
    pub fn with_services(
        api: Arc<dyn BlogApi>,
        session_store: Arc<SessionStore>,
        config: Arc<Config>,
        theme: Arc<Theme>,
        start: Route,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let ctx = ViewContext::new(api, session_store.clone(), config, theme, tx);
        let gate = AuthGate::new(session_store);

        let route = gate.check(start).target();
        let epoch = 1;
        let mut screen = screen_for(&route, ctx.with_epoch(epoch));
        screen.enter();
        info!("Starting at {}", route);

        Self {
            ctx,
            gate,
            route,
            history: Vec::new(),
            screen,
            epoch,
            events: rx,
            should_quit: false,
            status_message: String::new(),
        }
    }

    /// Replace the current screen with `route`, through the auth gate.
    fn show(&mut self, route: Route) {
        let target = match self.gate.check(route) {
            GateDecision::Allow(route) => route,
            GateDecision::Deny { redirect } => {
                self.status_message = "Please log in to continue.".to_string();
                redirect
            }
        };

        self.epoch += 1;
        let mut screen = screen_for(&target, self.ctx.with_epoch(self.epoch));
        screen.enter();
        debug!("Showing {} (epoch {})", target, self.epoch);

        self.screen = screen;
        self.route = target;
    }

    /// Navigate forward, remembering the current route for Back.
    pub fn navigate(&mut self, route: Route) {
        let previous = self.route.clone();
        self.show(route);
        if self.route != previous {
            if self.history.len() >= MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(previous);
        }
    }

    pub fn go_back(&mut self) {
        match self.history.pop() {
            Some(route) => self.show(route),
            None => self.show(Route::Home),
        }
    }

    /// Clear the session and go to the login view.
    pub fn logout(&mut self) {
        if let Err(e) = self.ctx.session_store.clear_session() {
            warn!("Failed to clear session: {}", e);
            self.status_message = format!("Logout failed: {}", e);
            return;
        }
        info!("Logged out");
        self.history.clear();
        self.show(Route::Login);
        self.status_message = "Logged out".to_string();
    }

    /// Carry out an action returned by the current screen.
    pub fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::StatusMessage(msg) => self.status_message = msg,
            ScreenAction::Navigate(route) => self.navigate(route),
            ScreenAction::NavigateWithStatus(route, msg) => {
                self.navigate(route);
                self.status_message = msg;
            }
            ScreenAction::Back => self.go_back(),
        }
    }

    /// Deliver a background result to the screen that asked for it.
    pub fn dispatch(&mut self, event: AppEvent) {
        if event.epoch != self.epoch {
            debug!(
                "Dropping event from epoch {} (current {}): {:?}",
                event.epoch, self.epoch, event.event
            );
            return;
        }
        let action = self.screen.handle_event(event.event);
        self.apply(action);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::F(1) => self.navigate(Route::Home),
            KeyCode::F(2) => self.navigate(Route::MyPosts),
            KeyCode::F(3) => self.navigate(Route::CreatePost),
            KeyCode::F(4) => self.navigate(Route::Profile),
            KeyCode::F(9) => self.navigate(Route::Login),
            KeyCode::F(10) => self.navigate(Route::Signup),
            KeyCode::F(12) if self.ctx.session_store.is_authenticated() => self.logout(),
            _ => {
                let action = self.screen.handle_key(key);
                self.apply(action);
            }
        }
    }

    /// Run the application.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Main event loop.
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            while let Ok(event) = self.events.try_recv() {
                self.dispatch(event);
            }

            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn nav_items(&self) -> Vec<NavItem> {
        let mut items = vec![NavItem {
            key: "F1",
            label: "Home".to_string(),
            route: Some(Route::Home),
        }];
        match self.ctx.session() {
            Some(session) => items.extend([
                NavItem {
                    key: "F2",
                    label: "My Blogs".to_string(),
                    route: Some(Route::MyPosts),
                },
                NavItem {
                    key: "F3",
                    label: "Create".to_string(),
                    route: Some(Route::CreatePost),
                },
                NavItem {
                    key: "F4",
                    label: session.name,
                    route: Some(Route::Profile),
                },
                NavItem {
                    key: "F12",
                    label: "Logout".to_string(),
                    route: None,
                },
            ]),
            None => items.extend([
                NavItem {
                    key: "F9",
                    label: "Login".to_string(),
                    route: Some(Route::Login),
                },
                NavItem {
                    key: "F10",
                    label: "Sign Up".to_string(),
                    route: Some(Route::Signup),
                },
            ]),
        }
        items
    }

    /// Draw the UI.
    fn draw(&mut self, f: &mut ratatui::Frame) {
        use ratatui::layout::{Constraint, Direction, Layout};
        use ratatui::style::{Modifier, Style};
        use ratatui::text::{Line, Span};
        use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

        let theme = self.ctx.theme.clone();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Navigation bar
                Constraint::Min(0),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        let items = self.nav_items();
        let selected = items
            .iter()
            .position(|item| item.route.as_ref() == Some(&self.route));
        let titles: Vec<Line> = items
            .iter()
            .map(|item| {
                Line::from(vec![
                    Span::styled(item.key, Style::default().fg(theme.muted)),
                    Span::raw(" "),
                    Span::raw(item.label.clone()),
                ])
            })
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(
                        "Blog.Dev",
                        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                    ))
                    .title(self.route.title()),
            )
            .select(selected)
            .style(Style::default().fg(theme.foreground))
            .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        self.screen.draw(f, chunks[1]);

        let mut spans = vec![Span::raw(" ")];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(
                self.status_message.clone(),
                Style::default().fg(theme.success),
            ));
            spans.push(Span::raw(" │ "));
        }
        for (key, action) in self
            .screen
            .hints()
            .iter()
            .chain([("Ctrl+C", "Quit")].iter())
        {
            spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
            spans.push(Span::styled(format!(" {}", action), Style::default().fg(theme.muted)));
            spans.push(Span::raw(" │ "));
        }
        spans.pop();
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[2]);
    }
}
