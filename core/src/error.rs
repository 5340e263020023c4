//! Error types for the blog API client.
//!
//! # Design
//! Every failed call surfaces as one `ApiError` whose `kind` is drawn from a
//! closed taxonomy, so callers can match on the kind without parsing
//! messages. Values are produced by the error classifier and the client
//! pipeline only; facades pass them through untouched.
//!
//! Configuration problems are a separate type (`ConfigError`) because they
//! happen before any request exists.

use std::fmt;

use thiserror::Error;

/// Category of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response reached the client (DNS, connection refused, timeout).
    Network,
    /// 401: token missing, invalid or expired. The session has been cleared.
    Auth,
    /// 403: authenticated but not allowed.
    Permission,
    /// 404.
    NotFound,
    /// 400 or 422; the message usually carries field-level detail.
    Validation,
    /// Any 5xx.
    Server,
    /// Anything else, including undecodable success bodies.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "NetworkError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::Permission => "PermissionError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Server => "ServerError",
            ErrorKind::Unknown => "UnknownError",
        };
        f.write_str(name)
    }
}

/// Typed error returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl ApiError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code,
        }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message, None)
    }

    /// A 2xx body that could not be decoded into the expected shape.
    pub(crate) fn decode(status: u16, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Unknown,
            format!("invalid response body: {err}"),
            Some(status),
        )
    }

    /// A request payload that could not be encoded as JSON.
    pub(crate) fn encode(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Unknown, format!("invalid request payload: {err}"), None)
    }

    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }
}

/// Errors raised while loading configuration or assembling a client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = ApiError::new(ErrorKind::NotFound, "Post not found", Some(404));
        assert_eq!(err.to_string(), "NotFoundError: Post not found");
    }

    #[test]
    fn decode_errors_keep_the_status() {
        let err = ApiError::decode(200, "expected value");
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.status_code, Some(200));
        assert!(err.message.contains("expected value"));
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = ApiError::network("connection refused");
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.status_code.is_none());
        assert!(!err.is_auth());
    }
}
