//! Error taxonomy for backend calls and its mapping to inline messages.

use thiserror::Error;

/// Failure of a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response at all (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// 401
    #[error("unauthorized")]
    Unauthorized,

    /// 403
    #[error("forbidden")]
    Forbidden,

    /// 404
    #[error("not found")]
    NotFound,

    /// Any other 4xx, with the backend's `detail` message when it sent one.
    #[error("request rejected ({status})")]
    Rejected { status: u16, detail: Option<String> },

    /// 5xx or an unexpected status.
    #[error("server error ({status})")]
    Server { status: u16 },

    /// Success status but a body we could not decode.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The action needs a session and there is none.
    #[error("not logged in")]
    NotLoggedIn,
}

impl ApiError {
    /// Classify a non-success status from a credential endpoint, where every
    /// 4xx is a rejection of the submitted form.
    pub fn from_credential_status(status: u16, detail: Option<String>) -> Self {
        match status {
            400..=499 => Self::Rejected { status, detail },
            _ => Self::Server { status },
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400..=499 => Self::Rejected { status, detail },
            _ => Self::Server { status },
        }
    }
}

/// The backend operation that produced an error, used to pick its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Signup,
    Login,
    ListPosts,
    FetchPost,
    LoadPostForEdit,
    FetchMyPosts,
    CreatePost,
    UpdatePost,
    DeletePost,
    ToggleLike,
    AddComment,
    DeleteComment,
}

impl Operation {
    fn fallback(self) -> &'static str {
        match self {
            Self::Signup => "Signup failed",
            Self::Login => "Login failed",
            Self::ListPosts => "Failed to load posts",
            Self::FetchPost | Self::LoadPostForEdit => "Failed to load the post.",
            Self::FetchMyPosts => "Failed to fetch your posts",
            Self::CreatePost => "Failed to create post",
            Self::UpdatePost => "Failed to update the post.",
            Self::DeletePost => "Failed to delete post",
            Self::ToggleLike => "Failed to toggle like",
            Self::AddComment => "Failed to post comment",
            Self::DeleteComment => "Failed to delete comment",
        }
    }

    fn not_logged_in(self) -> &'static str {
        match self {
            Self::CreatePost => "You must be logged in to create a post.",
            Self::ToggleLike => "Please log in to like posts.",
            Self::AddComment => "Please log in to comment.",
            Self::DeleteComment => "Please log in to delete comments.",
            _ => "User not logged in",
        }
    }
}

/// Turn an error into the message shown next to the form or list that
/// triggered it.
pub fn user_message(err: &ApiError, op: Operation) -> String {
    let msg = match err {
        ApiError::Network(_) => "Error connecting to server",
        ApiError::Unauthorized => match op {
            Operation::FetchMyPosts => "Unauthorized: Invalid or expired token",
            Operation::Login | Operation::Signup => op.fallback(),
            Operation::LoadPostForEdit | Operation::UpdatePost => {
                "Unauthorized. Please login again."
            }
            _ => "Unauthorized: Please log in again.",
        },
        ApiError::Forbidden => match op {
            Operation::UpdatePost => "You are not allowed to update this post.",
            Operation::DeletePost => "You are not allowed to delete this post.",
            Operation::DeleteComment => "You are not allowed to delete this comment.",
            _ => "You are not allowed to do that.",
        },
        ApiError::NotFound => match op {
            Operation::DeleteComment => "Comment not found.",
            Operation::Login | Operation::Signup => op.fallback(),
            _ => "Post not found.",
        },
        ApiError::Rejected {
            detail: Some(detail),
            ..
        } if !detail.trim().is_empty() => return detail.clone(),
        ApiError::Rejected { .. } | ApiError::Server { .. } | ApiError::Decode(_) => {
            op.fallback()
        }
        ApiError::NotLoggedIn => op.not_logged_in(),
    };
    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ApiError::from_status(401, None), ApiError::Unauthorized);
        assert_eq!(ApiError::from_status(403, None), ApiError::Forbidden);
        assert_eq!(ApiError::from_status(404, None), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(422, Some("bad".into())),
            ApiError::Rejected {
                status: 422,
                detail: Some("bad".into())
            }
        );
        assert_eq!(ApiError::from_status(502, None), ApiError::Server { status: 502 });
    }

    #[test]
    fn test_unauthorized_wording_depends_on_operation() {
        assert_eq!(
            user_message(&ApiError::Unauthorized, Operation::FetchMyPosts),
            "Unauthorized: Invalid or expired token"
        );
        assert_eq!(
            user_message(&ApiError::Unauthorized, Operation::CreatePost),
            "Unauthorized: Please log in again."
        );
        for op in [Operation::LoadPostForEdit, Operation::UpdatePost] {
            assert_eq!(
                user_message(&ApiError::Unauthorized, op),
                "Unauthorized. Please login again."
            );
        }
        assert_eq!(
            user_message(&ApiError::NotFound, Operation::LoadPostForEdit),
            "Post not found."
        );
        assert_eq!(
            user_message(&ApiError::Server { status: 500 }, Operation::LoadPostForEdit),
            "Failed to load the post."
        );
    }

    #[test]
    fn test_detail_wins_over_fallback() {
        let err = ApiError::Rejected {
            status: 400,
            detail: Some("Email already registered".into()),
        };
        assert_eq!(user_message(&err, Operation::Signup), "Email already registered");

        let err = ApiError::Rejected {
            status: 400,
            detail: None,
        };
        assert_eq!(user_message(&err, Operation::Signup), "Signup failed");
    }

    #[test]
    fn test_network_and_session_messages() {
        assert_eq!(
            user_message(&ApiError::Network("refused".into()), Operation::Login),
            "Error connecting to server"
        );
        assert_eq!(
            user_message(&ApiError::NotLoggedIn, Operation::CreatePost),
            "You must be logged in to create a post."
        );
        assert_eq!(
            user_message(&ApiError::Forbidden, Operation::UpdatePost),
            "You are not allowed to update this post."
        );
        assert_eq!(
            user_message(&ApiError::NotFound, Operation::FetchPost),
            "Post not found."
        );
    }
}
