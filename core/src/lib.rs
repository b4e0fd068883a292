//! Synchronous client core for a posts collection endpoint.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `PostClient` is stateless: it holds only the collection URL.
//! - List and create are each split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `PostSession` owns one screen's post list and status, and enforces that
//!   only one operation is in flight.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//! - The crate logs through `tracing` and never installs a subscriber.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::PostClient;
pub use error::{ApiError, SessionError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{PostSession, SessionConfig, SessionState, Status};
pub use types::{NewPost, Post};
