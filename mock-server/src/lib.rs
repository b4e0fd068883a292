//! In-memory stand-in for a JSONPlaceholder-style `/posts` collection.
//!
//! `GET /posts?_limit=N` returns the first `N` posts in insertion order and
//! `POST /posts` appends a new post with the next free id. `userId` is left
//! unset on creations, like the demo service does.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListOptions {
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
}

pub type Db = Arc<RwLock<Vec<Post>>>;

pub fn app() -> Router {
    app_with_posts(Vec::new())
}

pub fn app_with_posts(posts: Vec<Post>) -> Router {
    let db: Db = Arc::new(RwLock::new(posts));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .with_state(db)
}

/// `count` placeholder posts with ids `1..=count`, ten per author.
pub fn demo_posts(count: u64) -> Vec<Post> {
    (1..=count)
        .map(|id| Post {
            id,
            title: format!("Post {id}"),
            body: format!("Body of post {id}.\nSecond line."),
            user_id: Some((id - 1) / 10 + 1),
        })
        .collect()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_posts(listener: TcpListener, posts: Vec<Post>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_posts(posts)).await
}

async fn list_posts(State(db): State<Db>, Query(opts): Query<ListOptions>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    let limit = opts.limit.unwrap_or(usize::MAX);
    tracing::debug!(limit = ?opts.limit, total = posts.len(), "list posts");
    Json(posts.iter().take(limit).cloned().collect())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut posts = db.write().await;
    let id = posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    let post = Post {
        id,
        title: input.title,
        body: input.body,
        user_id: None,
    };
    tracing::debug!(id, "create post");
    posts.push(post.clone());
    (StatusCode::CREATED, Json(post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_user_id_in_camel_case() {
        let post = Post {
            id: 1,
            title: "Test".to_string(),
            body: "Body".to_string(),
            user_id: Some(4),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["userId"], 4);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn post_without_author_omits_user_id() {
        let post = Post {
            id: 2,
            title: "t".to_string(),
            body: "b".to_string(),
            user_id: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn new_post_rejects_missing_body() {
        let result: Result<NewPost, _> = serde_json::from_str(r#"{"title":"No body"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn list_options_reads_underscore_limit() {
        let opts: ListOptions = serde_json::from_str(r#"{"_limit":5}"#).unwrap();
        assert_eq!(opts.limit, Some(5));
    }

    #[test]
    fn demo_posts_have_sequential_ids_and_authors() {
        let posts = demo_posts(21);
        assert_eq!(posts.len(), 21);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[20].id, 21);
        assert_eq!(posts[9].user_id, Some(1));
        assert_eq!(posts[10].user_id, Some(2));
        assert_eq!(posts[20].user_id, Some(3));
    }
}
