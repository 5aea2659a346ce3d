//! Data models exchanged with the blog backend.

pub mod auth;
pub mod post;
pub mod session;

pub use auth::{Credentials, LoginResponse, SignupRequest};
pub use post::{Comment, LikeToggle, NewComment, NewPost, Post, PostUpdate};
pub use session::Session;
