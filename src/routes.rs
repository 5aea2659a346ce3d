//! Navigation shell: the fixed route table.

use std::fmt;

/// Whether a route needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Public,
    Protected,
}

/// One row of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub protection: Protection,
}

/// Every path the client knows, with its protection.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry { pattern: "/", protection: Protection::Public },
    RouteEntry { pattern: "/login", protection: Protection::Public },
    RouteEntry { pattern: "/signup", protection: Protection::Public },
    RouteEntry { pattern: "/create", protection: Protection::Protected },
    RouteEntry { pattern: "/myposts", protection: Protection::Protected },
    RouteEntry { pattern: "/edit/:id", protection: Protection::Protected },
    RouteEntry { pattern: "/profile", protection: Protection::Protected },
    RouteEntry { pattern: "/posts/:id", protection: Protection::Public },
];

/// A parsed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    CreatePost,
    MyPosts,
    EditPost(String),
    Profile,
    PostDetails(String),
}

impl Route {
    /// Parse a path such as `/posts/42`. Query strings and fragments are
    /// ignored, as is a trailing slash.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["signup"] => Self::Signup,
            ["create"] => Self::CreatePost,
            ["myposts"] => Self::MyPosts,
            ["profile"] => Self::Profile,
            ["edit", id] => Self::EditPost((*id).to_string()),
            ["posts", id] => Self::PostDetails((*id).to_string()),
            _ => return None,
        };
        Some(route)
    }

    /// Parse a path, falling back to Home for unknown locations.
    pub fn resolve(path: &str) -> Self {
        Self::parse(path).unwrap_or(Self::Home)
    }

    /// The concrete path of this route.
    pub fn path(&self) -> String {
        match self {
            Self::EditPost(id) => format!("/edit/{}", id),
            Self::PostDetails(id) => format!("/posts/{}", id),
            other => other.pattern().to_string(),
        }
    }

    /// The route-table pattern this route matches.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::CreatePost => "/create",
            Self::MyPosts => "/myposts",
            Self::EditPost(_) => "/edit/:id",
            Self::Profile => "/profile",
            Self::PostDetails(_) => "/posts/:id",
        }
    }

    pub fn protection(&self) -> Protection {
        let pattern = self.pattern();
        ROUTE_TABLE
            .iter()
            .find(|entry| entry.pattern == pattern)
            .map(|entry| entry.protection)
            .unwrap_or(Protection::Protected)
    }

    pub fn is_protected(&self) -> bool {
        self.protection() == Protection::Protected
    }

    /// Heading shown in the navigation bar.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Blog Posts",
            Self::Login => "Login",
            Self::Signup => "Sign Up",
            Self::CreatePost => "Create Post",
            Self::MyPosts => "My Blogs",
            Self::EditPost(_) => "Edit Post",
            Self::Profile => "My Profile",
            Self::PostDetails(_) => "Post",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
