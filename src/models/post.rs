//! Posts, comments and likes.

use chrono::format::{DelayedFormat, Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Write;

/// Used in place of a format that chrono cannot render.
pub const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// A blog post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    /// Backend identifier (numeric ids are kept in their decimal form)
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_email: String,
    /// Creation timestamp as sent by the backend
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    /// Emails of users who liked the post
    #[serde(default, deserialize_with = "null_as_default")]
    pub liked_users: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}

impl Post {
    /// First `chars` characters of the content followed by an ellipsis.
    pub fn excerpt(&self, chars: usize) -> String {
        let head: String = self.content.chars().take(chars).collect();
        format!("{}...", head)
    }

    /// Whether the given email is among the users who liked the post.
    pub fn is_liked_by(&self, email: &str) -> bool {
        self.liked_users.iter().any(|u| u == email)
    }
}

/// A comment nested under a post.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_email: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Response of `POST /posts/:id/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeToggle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub liked: bool,
}

/// Body of `POST /posts/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_email: String,
}

/// Body of `PUT /posts/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
}

/// Body of `POST /posts/:id/comments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub text: String,
}

/// Render a backend timestamp with the given strftime format.
///
/// Missing timestamps read "Unknown date", unparseable ones "Invalid date".
/// A format chrono cannot render falls back to [`FALLBACK_DATE_FORMAT`].
pub fn format_date(date: Option<&str>, format: &str) -> String {
    let Some(raw) = date.map(str::trim).filter(|d| !d.is_empty()) else {
        return "Unknown date".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return render(format, |f| dt.format(f));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return render(format, |f| dt.format(f));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return render(format, |f| dt.format(f));
        }
    }

    "Invalid date".to_string()
}

/// Whether every item of a strftime format is recognised.
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Format through `fmt::Write` so a rendering error (an unknown specifier,
/// or an offset asked of a naive time) becomes the fallback instead of a panic.
fn render<'a, F>(format: &'a str, formatted: F) -> String
where
    F: Fn(&'a str) -> DelayedFormat<StrftimeItems<'a>>,
{
    let mut out = String::new();
    if is_valid_date_format(format) && write!(out, "{}", formatted(format)).is_ok() {
        return out;
    }
    out.clear();
    match write!(out, "{}", formatted(FALLBACK_DATE_FORMAT)) {
        Ok(()) => out,
        Err(_) => "Invalid date".to_string(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_tolerates_sparse_payload() {
        let post: Post = serde_json::from_str(
            r#"{"id": 7, "title": "Hello", "content": "World", "likes_count": null}"#,
        )
        .unwrap();

        assert_eq!(post.id, "7");
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.views, 0);
        assert!(post.comments.is_empty());
        assert!(post.date.is_none());
    }

    #[test]
    fn test_post_with_comments() {
        let post: Post = serde_json::from_str(
            r#"{
                "id": "abc",
                "title": "T",
                "content": "C",
                "author": "Ada",
                "author_email": "ada@example.com",
                "date": "2024-05-01T10:30:00",
                "likes_count": 2,
                "views": 9,
                "liked_users": ["bob@example.com"],
                "comments": [
                    {"id": 1, "text": "nice", "author_name": "Bob", "author_email": "bob@example.com", "date": null}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].id, "1");
        assert!(post.is_liked_by("bob@example.com"));
        assert!(!post.is_liked_by("ada@example.com"));
    }

    #[test]
    fn test_like_toggle_accepts_null() {
        let toggle: LikeToggle =
            serde_json::from_str(r#"{"likes_count": null, "liked": true}"#).unwrap();
        assert_eq!(
            toggle,
            LikeToggle {
                likes_count: 0,
                liked: true
            }
        );
    }

    #[test]
    fn test_excerpt_always_appends_ellipsis() {
        let mut post: Post = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        post.content = "x".repeat(250);
        assert_eq!(post.excerpt(100), format!("{}...", "x".repeat(100)));

        post.content = "short".to_string();
        assert_eq!(post.excerpt(100), "short...");
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let mut post: Post = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        post.content = "é".repeat(5);
        assert_eq!(post.excerpt(3), "ééé...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-05-01T10:30:00"), "%d/%m/%Y"), "01/05/2024");
        assert_eq!(
            format_date(Some("2024-05-01T10:30:00.123456"), "%d/%m/%Y %H:%M"),
            "01/05/2024 10:30"
        );
        assert_eq!(format_date(Some("2024-05-01T10:30:00Z"), "%Y"), "2024");
        assert_eq!(format_date(Some("2024-05-01"), "%d/%m/%Y"), "01/05/2024");
        assert_eq!(format_date(None, "%d/%m/%Y"), "Unknown date");
        assert_eq!(format_date(Some("yesterday"), "%d/%m/%Y"), "Invalid date");
    }

    #[test]
    fn test_unrenderable_format_falls_back() {
        assert!(!is_valid_date_format("%Q"));
        assert_eq!(format_date(Some("2024-05-01T10:30:00"), "%Q"), "01/05/2024");
        assert_eq!(format_date(Some("2024-05-01T10:30:00Z"), "%d %Q"), "01/05/2024");
        // Naive timestamps carry no offset to print.
        assert_eq!(format_date(Some("2024-05-01T10:30:00"), "%H:%M %z"), "01/05/2024");
        assert_eq!(format_date(Some("2024-05-01T10:30:00+02:00"), "%z"), "+0200");
    }
}
