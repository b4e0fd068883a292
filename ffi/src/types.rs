//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, presence
//! flags instead of `Option`, and tagged enums with explicit discriminants.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use posts_core::{ApiError, HttpMethod, Post, PostSession, SessionError, Status};

/// Opaque handle to a `PostClient`.
pub struct FfiPostClient {
    pub(crate) inner: posts_core::PostClient,
}

/// Opaque handle to a `PostSession`. One per screen, owned by the host.
pub struct FfiPostSession {
    pub(crate) inner: posts_core::PostSession,
}

/// Convert to a heap C string. Interior NULs cannot be represented and are
/// dropped.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// The host executes the request and passes the response back through
/// `posts_parse_*` or `posts_session_complete`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: posts_core::HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this on the stack after executing a request. The FFI
/// layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiPostsResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    Decode = 2,
    Busy = 3,
    NotReady = 4,
    NothingPending = 5,
    Closed = 6,
    Panic = 7,
    NullArg = 8,
}

impl FfiErrorCode {
    pub(crate) fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Network { .. } => FfiErrorCode::Network,
            ApiError::Decode(_) => FfiErrorCode::Decode,
        }
    }
}

/// Tag that tells `posts_free_result` what `FfiPostsResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Post = 1,
    PostList = 2,
    Request = 3,
}

/// A single post exposed to C. `id` and `user_id` are only meaningful when
/// their `has_*` flag is set.
#[repr(C)]
pub struct FfiPost {
    pub has_id: bool,
    pub id: u64,
    pub title: *mut c_char,
    pub body: *mut c_char,
    pub has_user_id: bool,
    pub user_id: u64,
}

impl FfiPost {
    fn from_core(post: Post) -> Self {
        FfiPost {
            has_id: post.id.is_some(),
            id: post.id.unwrap_or_default(),
            title: to_c_string(post.title),
            body: to_c_string(post.body),
            has_user_id: post.user_id.is_some(),
            user_id: post.user_id.unwrap_or_default(),
        }
    }
}

/// A list of posts exposed to C, in display order.
#[repr(C)]
pub struct FfiPostList {
    pub items: *mut FfiPost,
    pub len: u32,
}

/// Result envelope for parse and session operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload tagged by `data_tag` (or is null for `None`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiPostsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiPostsResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiPostsResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiPostsResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a single `FfiPost`.
    pub(crate) fn ok_post(post: Post) -> *mut Self {
        let ffi_post = Box::new(FfiPost::from_core(post));
        Self::ok(FfiDataTag::Post, Box::into_raw(ffi_post) as *mut std::ffi::c_void)
    }

    /// Build a success result carrying a `FfiPostList`.
    pub(crate) fn ok_post_list(posts: Vec<Post>) -> *mut Self {
        let len = posts.len() as u32;
        let items = if posts.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_posts: Box<[FfiPost]> = posts.into_iter().map(FfiPost::from_core).collect();
            Box::into_raw(ffi_posts) as *mut FfiPost
        };
        let ffi_list = Box::new(FfiPostList { items, len });
        Self::ok(FfiDataTag::PostList, Box::into_raw(ffi_list) as *mut std::ffi::c_void)
    }

    /// Build a success result carrying the request a session wants executed.
    pub(crate) fn ok_request(req: posts_core::HttpRequest) -> *mut Self {
        let ffi_req = FfiHttpRequest::from_core(req);
        Self::ok(FfiDataTag::Request, ffi_req as *mut std::ffi::c_void)
    }

    /// Build a success result with no data payload.
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_api_error(err: ApiError) -> *mut Self {
        let code = FfiErrorCode::from_api_error(&err);
        Self::err(code, err.http_status().unwrap_or(0), err.to_string())
    }

    /// Build an error result from a `SessionError`.
    pub(crate) fn from_session_error(err: SessionError) -> *mut Self {
        let code = match err {
            SessionError::Busy => FfiErrorCode::Busy,
            SessionError::NotReady(_) => FfiErrorCode::NotReady,
            SessionError::NothingPending => FfiErrorCode::NothingPending,
            SessionError::Closed => FfiErrorCode::Closed,
            SessionError::Api(api) => return Self::from_api_error(api),
        };
        Self::err(code, 0, err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatusKind {
    Idle = 0,
    Loading = 1,
    Refreshing = 2,
    Submitting = 3,
    Error = 4,
}

/// Presentation signal for a session. `message` is non-null only for
/// `Error`, where `error_code` (`Network` or `Decode`) and `http_status`
/// describe the cause; otherwise `error_code` is `Ok`. `post_count` lets the
/// host skip copying an unchanged list.
#[repr(C)]
pub struct FfiSessionStatus {
    pub kind: FfiStatusKind,
    pub message: *mut c_char,
    pub error_code: FfiErrorCode,
    pub http_status: u16,
    pub post_count: u32,
}

impl FfiSessionStatus {
    pub(crate) fn from_core(session: &PostSession) -> *mut Self {
        let (kind, message) = match session.status() {
            Status::Idle => (FfiStatusKind::Idle, std::ptr::null_mut()),
            Status::Loading => (FfiStatusKind::Loading, std::ptr::null_mut()),
            Status::Refreshing => (FfiStatusKind::Refreshing, std::ptr::null_mut()),
            Status::Submitting => (FfiStatusKind::Submitting, std::ptr::null_mut()),
            Status::Error(msg) => (FfiStatusKind::Error, to_c_string(msg)),
        };
        let (error_code, http_status) = match session.last_error() {
            Some(err) if kind == FfiStatusKind::Error => {
                (FfiErrorCode::from_api_error(err), err.http_status().unwrap_or(0))
            }
            _ => (FfiErrorCode::Ok, 0),
        };
        Box::into_raw(Box::new(FfiSessionStatus {
            kind,
            message,
            error_code,
            http_status,
            post_count: session.posts().len() as u32,
        }))
    }
}
