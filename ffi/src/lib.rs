//! C-ABI wrapper around `posts-core`.
//!
//! # Overview
//! Exposes the posts client and the screen session through `extern "C"`
//! functions so a mobile host (Swift, Kotlin via JNI, C) can build requests,
//! execute them with its own networking stack, and hand the responses back.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Client `build_*` / `parse_*` mirror the core API 1:1.
//! - Session `begin_*` return the request to execute inside the same
//!   `FfiPostsResult` envelope (`data_tag = Request`), so session misuse
//!   (`Busy`, `Closed`) is reported like any other error.
//! - The host owns all returned pointers and must call the matching
//!   `posts_free_*` function to release them.

pub mod logging;
pub mod types;

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::num::NonZeroU32;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use posts_core::{HttpResponse, NewPost, PostClient, PostSession, SessionConfig};

use types::*;

/// Read a C string as UTF-8. Invalid sequences become U+FFFD so user text
/// is never silently dropped.
///
/// # Safety
/// `s` must be non-null and point to a NUL-terminated string that outlives
/// the returned value.
unsafe fn str_arg<'a>(s: *const c_char) -> Cow<'a, str> {
    unsafe { CStr::from_ptr(s) }.to_string_lossy()
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a stderr log subscriber with an `EnvFilter` directive such as
/// `"info"` or `"posts_core=debug"`. Null means `"info"`.
///
/// Returns false when the filter is invalid or a different filter is
/// already active.
#[unsafe(no_mangle)]
pub extern "C" fn posts_init_logging(filter: *const c_char) -> bool {
    catch_unwind(|| {
        let filter = if filter.is_null() {
            Cow::Borrowed("info")
        } else {
            unsafe { str_arg(filter) }
        };
        logging::init_logging(&filter).is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `PostClient` bound to the collection URL `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `posts_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_client_new(base_url: *const c_char) -> *mut FfiPostClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { str_arg(base_url) };
        Box::into_raw(Box::new(FfiPostClient {
            inner: PostClient::new(&url),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `posts_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_client_free(client: *mut FfiPostClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Client build/parse
// ---------------------------------------------------------------------------

/// Build a `GET <base>?_limit=<limit>` request.
///
/// Returns null if `client` is null or `limit` is zero.
/// The caller must free the returned pointer with `posts_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_build_list_posts(
    client: *const FfiPostClient,
    limit: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(limit) = NonZeroU32::new(limit) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_posts(limit))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a `POST <base>` request creating a post.
///
/// Returns null if any argument is null or if serialization fails.
#[unsafe(no_mangle)]
pub extern "C" fn posts_build_create_post(
    client: *const FfiPostClient,
    title: *const c_char,
    body: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || title.is_null() || body.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let input = NewPost::new(unsafe { str_arg(title) }, unsafe { str_arg(body) });
        match client.inner.build_create_post(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as the empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { str_arg(resp.body) }.into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Parse a list response. Returns `data_tag = PostList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn posts_parse_list_posts(
    client: *const FfiPostClient,
    response: *const FfiHttpResponse,
) -> *mut FfiPostsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiPostsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiPostsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_list_posts(core_resp) {
            Ok(posts) => FfiPostsResult::ok_post_list(posts),
            Err(e) => FfiPostsResult::from_api_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPostsResult::panic("panic in posts_parse_list_posts"))
}

/// Parse a create response. Returns `data_tag = Post` on success.
#[unsafe(no_mangle)]
pub extern "C" fn posts_parse_create_post(
    client: *const FfiPostClient,
    response: *const FfiHttpResponse,
) -> *mut FfiPostsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiPostsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiPostsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_create_post(core_resp) {
            Ok(post) => FfiPostsResult::ok_post(post),
            Err(e) => FfiPostsResult::from_api_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPostsResult::panic("panic in posts_parse_create_post"))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Create a session for one screen. A zero limit selects the default
/// (5 for the initial load, 20 for refreshes).
///
/// Returns null if `base_url` is null. Free with `posts_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_new(
    base_url: *const c_char,
    initial_limit: u32,
    refresh_limit: u32,
) -> *mut FfiPostSession {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let defaults = SessionConfig::default();
        let config = SessionConfig {
            initial_limit: NonZeroU32::new(initial_limit).unwrap_or(defaults.initial_limit),
            refresh_limit: NonZeroU32::new(refresh_limit).unwrap_or(defaults.refresh_limit),
        };
        let client = PostClient::new(&unsafe { str_arg(base_url) });
        Box::into_raw(Box::new(FfiPostSession {
            inner: PostSession::new(client, config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session. Safe to call with null. Does not need a prior
/// `posts_session_close`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_free(session: *mut FfiPostSession) {
    if !session.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(session) });
        });
    }
}

/// Run `op` against a session, mapping null and panics into the result
/// envelope.
fn with_session(
    session: *mut FfiPostSession,
    name: &str,
    op: impl FnOnce(&mut PostSession) -> *mut FfiPostsResult,
) -> *mut FfiPostsResult {
    if session.is_null() {
        return FfiPostsResult::null_arg("session");
    }
    catch_unwind(AssertUnwindSafe(|| {
        let session = unsafe { &mut *session };
        op(&mut session.inner)
    }))
    .unwrap_or_else(|_| FfiPostsResult::panic(&format!("panic in {name}")))
}

/// Start the initial load. Returns `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_begin_load(session: *mut FfiPostSession) -> *mut FfiPostsResult {
    with_session(session, "posts_session_begin_load", |s| match s.begin_load() {
        Ok(req) => FfiPostsResult::ok_request(req),
        Err(e) => FfiPostsResult::from_session_error(e),
    })
}

/// Start a refresh. Returns `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_begin_refresh(session: *mut FfiPostSession) -> *mut FfiPostsResult {
    with_session(session, "posts_session_begin_refresh", |s| match s.begin_refresh() {
        Ok(req) => FfiPostsResult::ok_request(req),
        Err(e) => FfiPostsResult::from_session_error(e),
    })
}

/// Start a create. Returns `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_begin_submit(
    session: *mut FfiPostSession,
    title: *const c_char,
    body: *const c_char,
) -> *mut FfiPostsResult {
    if title.is_null() {
        return FfiPostsResult::null_arg("title");
    }
    if body.is_null() {
        return FfiPostsResult::null_arg("body");
    }
    with_session(session, "posts_session_begin_submit", |s| {
        let (title, body) = unsafe { (str_arg(title), str_arg(body)) };
        match s.begin_submit(&title, &body) {
            Ok(req) => FfiPostsResult::ok_request(req),
            Err(e) => FfiPostsResult::from_session_error(e),
        }
    })
}

/// Finish the pending operation with the response the host received.
/// Returns `data_tag = None` on success; on failure the error is also
/// recorded on the session and visible through `posts_session_status`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_complete(
    session: *mut FfiPostSession,
    response: *const FfiHttpResponse,
) -> *mut FfiPostsResult {
    if response.is_null() {
        return FfiPostsResult::null_arg("response");
    }
    with_session(session, "posts_session_complete", |s| {
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match s.complete(core_resp) {
            Ok(()) => FfiPostsResult::ok_empty(),
            Err(e) => FfiPostsResult::from_session_error(e),
        }
    })
}

/// Report that the pending request could not be executed (no connectivity,
/// timeout). `message` may be null. The failure is recorded on the session
/// and returned with `error_code = Network`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_fail_transport(
    session: *mut FfiPostSession,
    message: *const c_char,
) -> *mut FfiPostsResult {
    with_session(session, "posts_session_fail_transport", |s| {
        let message = if message.is_null() {
            Cow::Borrowed("transport failed")
        } else {
            unsafe { str_arg(message) }
        };
        match s.fail_transport(&message) {
            Ok(()) => FfiPostsResult::ok_empty(),
            Err(e) => FfiPostsResult::from_session_error(e),
        }
    })
}

/// Tear the session down; responses arriving later are ignored. The handle
/// stays valid until `posts_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_close(session: *mut FfiPostSession) {
    if session.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &mut *session }.inner.close();
    }));
}

/// Current presentation status. Returns null if `session` is null.
/// Free with `posts_free_status`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_status(session: *const FfiPostSession) -> *mut FfiSessionStatus {
    catch_unwind(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let session = unsafe { &*session };
        FfiSessionStatus::from_core(&session.inner)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Snapshot of the session's posts in display order. Returns
/// `data_tag = PostList`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_session_posts(session: *const FfiPostSession) -> *mut FfiPostsResult {
    catch_unwind(|| {
        if session.is_null() {
            return FfiPostsResult::null_arg("session");
        }
        let session = unsafe { &*session };
        FfiPostsResult::ok_post_list(session.inner.posts().to_vec())
    })
    .unwrap_or_else(|_| FfiPostsResult::panic("panic in posts_session_posts"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Release an `FfiHttpRequest` and everything it owns.
///
/// # Safety
/// `req` must come from `FfiHttpRequest::from_core` and not be freed twice.
unsafe fn free_request_inner(req: *mut FfiHttpRequest) {
    let req = unsafe { Box::from_raw(req) };
    if !req.path.is_null() {
        drop(unsafe { CString::from_raw(req.path) });
    }
    if !req.body.is_null() {
        drop(unsafe { CString::from_raw(req.body) });
    }
    if !req.headers.is_null() && req.headers_len > 0 {
        let headers = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ))
        };
        for h in headers.iter() {
            if !h.key.is_null() {
                drop(unsafe { CString::from_raw(h.key) });
            }
            if !h.value.is_null() {
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
}

/// Free an `FfiHttpRequest` returned by any `posts_build_*` function.
/// Safe to call with null. Requests carried inside an `FfiPostsResult` are
/// freed by `posts_free_result` instead.
#[unsafe(no_mangle)]
pub extern "C" fn posts_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { free_request_inner(req) });
}

/// Free an `FfiPostsResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn posts_free_result(result: *mut FfiPostsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Post => {
                let post = unsafe { Box::from_raw(result.data as *mut FfiPost) };
                free_ffi_post_fields(&post);
            }
            FfiDataTag::PostList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiPostList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_ffi_post_fields(item);
                    }
                }
            }
            FfiDataTag::Request => unsafe {
                free_request_inner(result.data as *mut FfiHttpRequest);
            },
            FfiDataTag::None => {}
        }
    });
}

/// Free the C-string fields of an `FfiPost` (but not the struct itself).
fn free_ffi_post_fields(post: &FfiPost) {
    if !post.title.is_null() {
        drop(unsafe { CString::from_raw(post.title) });
    }
    if !post.body.is_null() {
        drop(unsafe { CString::from_raw(post.body) });
    }
}

/// Free an `FfiSessionStatus` returned by `posts_session_status`. Safe to
/// call with null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_free_status(status: *mut FfiSessionStatus) {
    if status.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let status = unsafe { Box::from_raw(status) };
        if !status.message.is_null() {
            drop(unsafe { CString::from_raw(status.message) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
