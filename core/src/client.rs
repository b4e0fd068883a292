//! Stateless HTTP request builder and response parser for the posts
//! collection endpoint.
//!
//! # Design
//! `PostClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.
//!
//! `base_url` is the collection itself (`https://host/posts`), not a service
//! root: list requests append `_limit=N` to its query string and creates post
//! to it as is. A base that already carries a query (`/posts?userId=1`) keeps
//! it.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPost, Post};

/// Synchronous, stateless client for the posts collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostClient {
    base_url: String,
}

impl PostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches(['/', '?', '&']).to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET <base>?_limit=<limit>`.
    pub fn build_list_posts(&self, limit: NonZeroU32) -> HttpRequest {
        debug!(limit = limit.get(), "build list posts request");
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{}_limit={limit}", self.base_url, self.query_separator()),
            headers: Vec::new(),
            body: None,
        }
    }

    fn query_separator(&self) -> char {
        if self.base_url.contains('?') { '&' } else { '?' }
    }

    /// `POST <base>` with a `{"title":..,"body":..}` JSON body. Empty strings
    /// are sent as is.
    pub fn build_create_post(&self, input: &NewPost) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)
            .map_err(|e| ApiError::Decode(format!("encoding request body: {e}")))?;
        debug!(title_len = input.title.len(), body_len = input.body.len(), "build create post request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.base_url.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Parse a list response. The batch is returned exactly as the service
    /// ordered it; a batch that repeats an id is rejected.
    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        let posts: Vec<Post> = decode(&response.body)?;
        check_unique_ids(&posts)?;
        debug!(count = posts.len(), "parsed post list");
        Ok(posts)
    }

    /// Parse a create response: whatever the service echoed back.
    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        let post: Post = decode(&response.body)?;
        debug!(id = ?post.id, "parsed created post");
        Ok(post)
    }
}

/// Map non-2xx status codes to a network error carrying the status and body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "unexpected response status");
    Err(ApiError::Network {
        status: Some(response.status),
        message: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "response body did not decode");
        ApiError::Decode(e.to_string())
    })
}

fn check_unique_ids(posts: &[Post]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(posts.len());
    for id in posts.iter().filter_map(|p| p.id) {
        if !seen.insert(id) {
            return Err(ApiError::Decode(format!("duplicate post id {id} in batch")));
        }
    }
    Ok(())
}
