//! Error types for the posts client and session.
//!
//! # Design
//! Remote failures come in two kinds only. `Network` covers everything that
//! stops a round-trip from producing usable data at the transport level: the
//! host could not complete the call (`status: None`) or the service answered
//! with a non-2xx status. `Decode` covers the JSON codec: a body that is not
//! the expected shape, or a list batch that violates id uniqueness.
//!
//! `SessionError` is separate: it reports misuse of the screen-session state
//! machine (starting an operation while another is pending, completing one
//! that was never started) and wraps `ApiError` when a completion fails.

/// Errors returned by `PostClient` parse methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{}", describe_network(.status, .message))]
    Network { status: Option<u16>, message: String },

    #[error("decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// A transport-level failure reported by the host.
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Network {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status that caused the failure, if the service answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => *status,
            ApiError::Decode(_) => None,
        }
    }
}

fn describe_network(status: &Option<u16>, message: &str) -> String {
    match *status {
        Some(status) if message.is_empty() => format!("HTTP {status}"),
        Some(status) => format!("HTTP {status}: {message}"),
        None => format!("network error: {message}"),
    }
}

/// Errors returned by `PostSession` transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another operation is still in flight.
    #[error("an operation is already in progress")]
    Busy,

    /// The operation is not allowed from the current state, e.g. a refresh
    /// before the initial load was started.
    #[error("operation not allowed in state `{0}`")]
    NotReady(&'static str),

    /// `complete` or `fail` was called with no operation in flight.
    #[error("no operation is pending")]
    NothingPending,

    /// The session was torn down.
    #[error("session is closed")]
    Closed,

    /// The pending operation failed; the failure is recorded on the session.
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_display_with_status() {
        let err = ApiError::Network {
            status: Some(500),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(err.http_status(), Some(500));
    }

    #[test]
    fn network_display_without_body() {
        let err = ApiError::Network {
            status: Some(503),
            message: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[test]
    fn transport_display() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_string(), "network error: connection refused");
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn session_error_wraps_api_error_transparently() {
        let err: SessionError = ApiError::Decode("expected array".to_string()).into();
        assert_eq!(err.to_string(), "decode failed: expected array");
    }
}
