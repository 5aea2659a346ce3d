//! Backend services.

pub mod api;
pub mod generation;
pub mod session_store;
pub mod storage;
pub mod theme;

pub use api::{BlogApi, HttpBlogApi};
pub use generation::{RequestGeneration, Ticket};
pub use session_store::SessionStore;
pub use storage::LocalStorage;
pub use theme::Theme;
