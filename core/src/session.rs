//! Screen-session state: the latest known post list plus operation status.
//!
//! # Design
//! A `PostSession` is owned by exactly one presentation screen, from mount to
//! teardown. It drives `PostClient` in the same host-does-IO style: every
//! `begin_*` transition hands back the `HttpRequest` to execute, and the host
//! reports the outcome through `complete` (a response arrived) or `fail` (the
//! transport did not complete).
//!
//! ```text
//! Idle ──begin_load──▶ Loading ──▶ Loaded | Failed
//! Loaded | Failed ──begin_refresh──▶ Refreshing ──▶ Loaded | Failed
//! Loaded | Failed ──begin_submit───▶ Submitting ──▶ Loaded (prepended) | Failed
//! any ──close──▶ Closed
//! ```
//!
//! # Invariants
//! - At most one operation is in flight.
//! - A failure never discards previously loaded posts.
//! - A list success replaces the sequence; a create success prepends to it.
//! - Nothing changes after `close`.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::PostClient;
use crate::error::{ApiError, SessionError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewPost, Post};

const DEFAULT_INITIAL_LIMIT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => unreachable!(),
};
const DEFAULT_REFRESH_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => unreachable!(),
};

/// Page sizes requested by a session. Zero is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Limit for the load issued on mount.
    pub initial_limit: NonZeroU32,
    /// Limit for user-triggered refreshes.
    pub refresh_limit: NonZeroU32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_limit: DEFAULT_INITIAL_LIMIT,
            refresh_limit: DEFAULT_REFRESH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Loaded,
    Refreshing,
    Submitting,
    Failed,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Loaded => "loaded",
            SessionState::Refreshing => "refreshing",
            SessionState::Submitting => "submitting",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SessionState::Loading | SessionState::Refreshing | SessionState::Submitting
        )
    }
}

/// Operation status as shown by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Refreshing,
    Submitting,
    Error(String),
}

/// The most recent failed operation and its cause.
#[derive(Debug, Clone)]
struct Failure {
    action: &'static str,
    error: ApiError,
}

#[derive(Debug)]
pub struct PostSession {
    client: PostClient,
    config: SessionConfig,
    state: SessionState,
    posts: Vec<Post>,
    last_failure: Option<Failure>,
}

impl PostSession {
    pub fn new(client: PostClient, config: SessionConfig) -> Self {
        Self {
            client,
            config,
            state: SessionState::Idle,
            posts: Vec::new(),
            last_failure: None,
        }
    }

    pub fn client(&self) -> &PostClient {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Latest known posts, newest creations first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Cause of the most recent failure, kept until the next success.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_failure.as_ref().map(|f| &f.error)
    }

    /// User-facing text for the most recent failure, e.g.
    /// `"Failed to fetch posts: HTTP 503"`.
    pub fn error_message(&self) -> Option<String> {
        self.last_failure
            .as_ref()
            .map(|f| format!("{}: {}", f.action, f.error))
    }

    pub fn status(&self) -> Status {
        match self.state {
            SessionState::Loading => Status::Loading,
            SessionState::Refreshing => Status::Refreshing,
            SessionState::Submitting => Status::Submitting,
            SessionState::Failed => Status::Error(self.error_message().unwrap_or_default()),
            SessionState::Idle | SessionState::Loaded | SessionState::Closed => Status::Idle,
        }
    }

    /// Initial load on mount, using `config.initial_limit`.
    pub fn begin_load(&mut self) -> Result<HttpRequest, SessionError> {
        self.ensure_can_start(&[SessionState::Idle])?;
        let request = self.client.build_list_posts(self.config.initial_limit);
        self.transition(SessionState::Loading);
        Ok(request)
    }

    /// User-triggered refresh, using `config.refresh_limit`.
    pub fn begin_refresh(&mut self) -> Result<HttpRequest, SessionError> {
        self.ensure_can_start(&[SessionState::Loaded, SessionState::Failed])?;
        let request = self.client.build_list_posts(self.config.refresh_limit);
        self.transition(SessionState::Refreshing);
        Ok(request)
    }

    pub fn begin_submit(&mut self, title: &str, body: &str) -> Result<HttpRequest, SessionError> {
        self.ensure_can_start(&[SessionState::Loaded, SessionState::Failed])?;
        let request = self.client.build_create_post(&NewPost::new(title, body))?;
        self.transition(SessionState::Submitting);
        Ok(request)
    }

    /// Finish the pending operation with the response the host received.
    ///
    /// On a remote failure the error is recorded on the session (posts are
    /// kept) and also returned as `SessionError::Api`.
    pub fn complete(&mut self, response: HttpResponse) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => {
                warn!(status = response.status, "response arrived after session close; ignored");
                Ok(())
            }
            SessionState::Loading | SessionState::Refreshing => {
                match self.client.parse_list_posts(response) {
                    Ok(posts) => {
                        self.posts = posts;
                        self.succeed();
                        Ok(())
                    }
                    Err(err) => Err(self.record_failure(err)),
                }
            }
            SessionState::Submitting => match self.client.parse_create_post(response) {
                Ok(post) => {
                    self.posts.insert(0, post);
                    self.succeed();
                    Ok(())
                }
                Err(err) => Err(self.record_failure(err)),
            },
            SessionState::Idle | SessionState::Loaded | SessionState::Failed => {
                Err(SessionError::NothingPending)
            }
        }
    }

    /// Record that the pending operation failed before any response arrived.
    ///
    /// Like `complete`, the failure is recorded on the session and returned
    /// as `SessionError::Api`.
    pub fn fail(&mut self, err: ApiError) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            warn!(error = %err, "failure reported after session close; ignored");
            return Ok(());
        }
        if !self.state.is_pending() {
            return Err(SessionError::NothingPending);
        }
        Err(self.record_failure(err))
    }

    pub fn fail_transport(&mut self, message: &str) -> Result<(), SessionError> {
        self.fail(ApiError::transport(message))
    }

    /// Tear the session down. Posts are discarded and any in-flight
    /// completion is ignored when it arrives.
    pub fn close(&mut self) {
        self.posts.clear();
        self.last_failure = None;
        self.transition(SessionState::Closed);
    }

    fn ensure_can_start(&self, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(match self.state {
            SessionState::Closed => SessionError::Closed,
            s if s.is_pending() => SessionError::Busy,
            s => SessionError::NotReady(s.as_str()),
        })
    }

    fn succeed(&mut self) {
        self.last_failure = None;
        self.transition(SessionState::Loaded);
    }

    fn record_failure(&mut self, err: ApiError) -> SessionError {
        let action = match self.state {
            SessionState::Submitting => "Failed to add post",
            _ => "Failed to fetch posts",
        };
        warn!(state = self.state.as_str(), error = %err, "{action}");
        self.last_failure = Some(Failure {
            action,
            error: err.clone(),
        });
        self.transition(SessionState::Failed);
        SessionError::Api(err)
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = self.state.as_str(), to = next.as_str(), "session transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    const THREE_POSTS: &str = r#"[
        {"id":1,"title":"one","body":"1","userId":1},
        {"id":2,"title":"two","body":"2","userId":1},
        {"id":3,"title":"three","body":"3","userId":2}
    ]"#;

    fn session() -> PostSession {
        PostSession::new(
            PostClient::new("http://localhost:3000/posts"),
            SessionConfig::default(),
        )
    }

    fn loaded_session() -> PostSession {
        let mut s = session();
        s.begin_load().unwrap();
        s.complete(HttpResponse::new(200, THREE_POSTS)).unwrap();
        s
    }

    fn ids(s: &PostSession) -> Vec<Option<u64>> {
        s.posts().iter().map(|p| p.id).collect()
    }

    #[test]
    fn starts_idle_and_empty() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.status(), Status::Idle);
        assert!(s.posts().is_empty());
    }

    #[test]
    fn load_uses_initial_limit_and_replaces_posts() {
        let mut s = session();
        let req = s.begin_load().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/posts?_limit=5");
        assert_eq!(s.status(), Status::Loading);

        s.complete(HttpResponse::new(200, THREE_POSTS)).unwrap();
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(ids(&s), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn refresh_uses_refresh_limit() {
        let mut s = loaded_session();
        let req = s.begin_refresh().unwrap();
        assert_eq!(req.path, "http://localhost:3000/posts?_limit=20");
        assert_eq!(s.status(), Status::Refreshing);
    }

    #[test]
    fn custom_limits_from_json_config() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"initial_limit":10,"refresh_limit":50}"#).unwrap();
        let mut s = PostSession::new(PostClient::new("http://h/posts"), config);
        assert_eq!(s.begin_load().unwrap().path, "http://h/posts?_limit=10");
        s.complete(HttpResponse::new(200, "[]")).unwrap();
        assert_eq!(s.begin_refresh().unwrap().path, "http://h/posts?_limit=50");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"refresh_limit":7}"#).unwrap();
        assert_eq!(config.initial_limit.get(), 5);
        assert_eq!(config.refresh_limit.get(), 7);
    }

    #[test]
    fn zero_limit_is_rejected_in_config() {
        let result: Result<SessionConfig, _> = serde_json::from_str(r#"{"initial_limit":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn submit_prepends_and_keeps_prior_order() {
        let mut s = loaded_session();
        let req = s.begin_submit("A", "B").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"title":"A","body":"B"}"#));
        assert_eq!(s.status(), Status::Submitting);

        s.complete(HttpResponse::new(201, r#"{"title":"A","body":"B","id":101}"#))
            .unwrap();
        assert_eq!(ids(&s), vec![Some(101), Some(1), Some(2), Some(3)]);
        assert_eq!(s.state(), SessionState::Loaded);
    }

    #[test]
    fn submit_without_id_still_prepends() {
        let mut s = session();
        s.begin_load().unwrap();
        s.complete(HttpResponse::new(200, "[]")).unwrap();
        s.begin_submit("Hello", "World").unwrap();
        s.complete(HttpResponse::new(201, r#"{"title":"Hello","body":"World"}"#))
            .unwrap();
        assert_eq!(s.posts().len(), 1);
        assert_eq!(s.posts()[0].title, "Hello");
        assert_eq!(s.posts()[0].id, None);
    }

    #[test]
    fn transport_failure_on_refresh_keeps_posts() {
        let mut s = loaded_session();
        s.begin_refresh().unwrap();
        let err = s.fail_transport("connection reset").unwrap_err();

        assert_eq!(
            err,
            SessionError::Api(ApiError::transport("connection reset"))
        );
        assert_eq!(s.last_error(), Some(&ApiError::transport("connection reset")));
        assert_eq!(s.state(), SessionState::Failed);
        assert_eq!(ids(&s), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            s.status(),
            Status::Error("Failed to fetch posts: network error: connection reset".to_string())
        );
    }

    #[test]
    fn transport_failure_on_submit_keeps_posts() {
        let mut s = loaded_session();
        s.begin_submit("t", "b").unwrap();
        let err = s.fail_transport("offline").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Api(ApiError::Network { status: None, .. })
        ));
        assert_eq!(ids(&s), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            s.error_message().as_deref(),
            Some("Failed to add post: network error: offline")
        );
    }

    #[test]
    fn malformed_refresh_is_decode_error_and_keeps_posts() {
        let mut s = loaded_session();
        s.begin_refresh().unwrap();
        let err = s.complete(HttpResponse::new(200, r#"{"oops":true}"#)).unwrap_err();
        assert!(matches!(err, SessionError::Api(ApiError::Decode(_))));
        assert_eq!(ids(&s), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn server_error_on_submit_is_network_error() {
        let mut s = loaded_session();
        s.begin_submit("t", "b").unwrap();
        let err = s.complete(HttpResponse::new(500, "boom")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Api(ApiError::Network { status: Some(500), .. })
        ));
        assert_eq!(s.posts().len(), 3);
    }

    #[test]
    fn transport_and_status_failures_report_alike() {
        let mut s = loaded_session();
        s.begin_refresh().unwrap();
        let transport = s.fail_transport("offline").unwrap_err();
        s.begin_refresh().unwrap();
        let status = s.complete(HttpResponse::new(503, "")).unwrap_err();

        assert!(matches!(transport, SessionError::Api(ApiError::Network { .. })));
        assert!(matches!(status, SessionError::Api(ApiError::Network { .. })));
        assert_eq!(s.last_error().and_then(ApiError::http_status), Some(503));
        assert_eq!(
            s.status(),
            Status::Error("Failed to fetch posts: HTTP 503".to_string())
        );
        assert_eq!(ids(&s), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn success_after_failure_clears_error() {
        let mut s = loaded_session();
        s.begin_refresh().unwrap();
        s.fail_transport("down").unwrap_err();
        assert!(s.last_error().is_some());

        s.begin_refresh().unwrap();
        s.complete(HttpResponse::new(200, "[]")).unwrap();
        assert!(s.last_error().is_none());
        assert_eq!(s.status(), Status::Idle);
        assert!(s.posts().is_empty());
    }

    #[test]
    fn failed_initial_load_can_be_retried_with_refresh() {
        let mut s = session();
        s.begin_load().unwrap();
        s.fail_transport("no route").unwrap_err();
        assert!(s.begin_load().is_err());
        assert!(s.begin_refresh().is_ok());
    }

    #[test]
    fn only_one_operation_in_flight() {
        let mut s = loaded_session();
        s.begin_submit("t", "b").unwrap();
        assert_eq!(s.begin_submit("t", "b").unwrap_err(), SessionError::Busy);
        assert_eq!(s.begin_refresh().unwrap_err(), SessionError::Busy);
    }

    #[test]
    fn refresh_and_submit_need_a_started_session() {
        let mut s = session();
        assert_eq!(s.begin_refresh().unwrap_err(), SessionError::NotReady("idle"));
        assert_eq!(
            s.begin_submit("t", "b").unwrap_err(),
            SessionError::NotReady("idle")
        );
    }

    #[test]
    fn load_happens_once() {
        let mut s = loaded_session();
        assert_eq!(s.begin_load().unwrap_err(), SessionError::NotReady("loaded"));
    }

    #[test]
    fn completing_without_pending_operation_is_an_error() {
        let mut s = loaded_session();
        assert_eq!(
            s.complete(HttpResponse::new(200, "[]")).unwrap_err(),
            SessionError::NothingPending
        );
        assert_eq!(s.fail_transport("x").unwrap_err(), SessionError::NothingPending);
    }

    #[test]
    fn completion_after_close_is_ignored() {
        let mut s = session();
        s.begin_load().unwrap();
        s.close();
        s.complete(HttpResponse::new(200, THREE_POSTS)).unwrap();
        assert_eq!(s.state(), SessionState::Closed);
        assert!(s.posts().is_empty());
        s.fail_transport("late").unwrap();
        assert!(s.last_error().is_none());
    }

    #[test]
    fn closed_session_rejects_new_operations() {
        let mut s = loaded_session();
        s.close();
        assert_eq!(s.begin_refresh().unwrap_err(), SessionError::Closed);
        assert_eq!(s.begin_load().unwrap_err(), SessionError::Closed);
    }
}
