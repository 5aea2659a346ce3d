//! Authenticated user session.

use serde::{Deserialize, Serialize};

use super::LoginResponse;

/// Identity and bearer token of the logged-in user.
///
/// A session is either complete or absent. Construct one through
/// [`Session::new`] or [`Session::from_login`], both of which reject empty
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Display name
    pub name: String,
    /// Account email, also used to recognise the user's own comments and likes
    pub email: String,
    /// Opaque bearer token sent in the Authorization header
    pub token: String,
}

impl Session {
    /// Build a session, returning `None` if any field is blank.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Option<Self> {
        let session = Self {
            name: name.into(),
            email: email.into(),
            token: token.into(),
        };
        session.is_complete().then_some(session)
    }

    /// Build a session from a successful login response.
    pub fn from_login(response: LoginResponse) -> Option<Self> {
        Self::new(response.name, response.email, response.token)
    }

    /// Whether every field is populated.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty() && !self.token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_blank_fields() {
        assert!(Session::new("Ada", "ada@example.com", "tok").is_some());
        assert!(Session::new("", "ada@example.com", "tok").is_none());
        assert!(Session::new("Ada", "  ", "tok").is_none());
        assert!(Session::new("Ada", "ada@example.com", "").is_none());
    }

    #[test]
    fn test_from_login_requires_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert!(Session::from_login(response).is_none());
    }
}
