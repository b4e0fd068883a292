//! Domain DTOs for the posts collection endpoint.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any drift between the two crates.
//!
//! `id` and `userId` are optional: the demo service echoes creations back
//! without durably assigning either, so callers must not assume they are set.

use serde::{Deserialize, Serialize};

/// A single post as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

/// Request payload for creating a post. Field order is the wire order:
/// `{"title":..,"body":..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_reads_camel_case_user_id() {
        let post: Post =
            serde_json::from_str(r#"{"id":7,"title":"t","body":"b","userId":3}"#).unwrap();
        assert_eq!(post.id, Some(7));
        assert_eq!(post.user_id, Some(3));
    }

    #[test]
    fn post_tolerates_missing_id_and_user_id() {
        let post: Post = serde_json::from_str(r#"{"title":"Hello","body":"World"}"#).unwrap();
        assert_eq!(post.id, None);
        assert_eq!(post.user_id, None);
        assert_eq!(post.title, "Hello");
    }

    #[test]
    fn post_requires_title_and_body() {
        let result: Result<Post, _> = serde_json::from_str(r#"{"id":1,"title":"only title"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_post_serializes_title_then_body() {
        let json = serde_json::to_string(&NewPost::new("A", "B")).unwrap();
        assert_eq!(json, r#"{"title":"A","body":"B"}"#);
    }
}
