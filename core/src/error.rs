//! Error types for the Weibo API client.
//!
//! # Design
//! Every way a call can fail lands in one `ApiError`, whether the failure is
//! detected locally (bad input, missing token) or comes back from the
//! executor (transport failure, non-2xx status). Async listeners and sync
//! callers therefore match on the same type. `HttpStatus` keeps the raw body
//! because Weibo reports API errors as a JSON payload the caller may want to
//! inspect.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an `HttpExecutor` when no HTTP response was obtained
/// (connection refused, DNS failure, timeout, unreadable body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

/// Errors produced while building or dispatching a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An argument was missing, malformed or out of range.
    #[error("invalid `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No access token was supplied, or it has expired.
    #[error("access token is missing or expired")]
    MissingCredential,

    /// The executor could not complete the HTTP exchange.
    #[error("network failure: {0}")]
    Network(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A batch parameter was given no ids.
    #[error("id batch is empty")]
    EmptyBatch,

    /// A batch parameter was given more ids than the endpoint accepts.
    #[error("id batch holds {actual} ids, endpoint accepts at most {max}")]
    BatchSizeExceeded { max: usize, actual: usize },

    /// A structured parameter could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse category of an `ApiError`, stable across the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    MissingCredential,
    Network,
    HttpStatus,
    EmptyBatch,
    BatchSizeExceeded,
    Serialization,
}

impl ApiError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::MissingCredential => ErrorKind::MissingCredential,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::EmptyBatch => ErrorKind::EmptyBatch,
            ApiError::BatchSizeExceeded { .. } => ErrorKind::BatchSizeExceeded,
            ApiError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// HTTP status of the response, when the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the error was raised before anything reached the executor.
    pub fn is_local(&self) -> bool {
        !matches!(self, ApiError::Network(_) | ApiError::HttpStatus { .. })
    }
}

/// Errors raised while loading an `ApiConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{field}` is not a valid absolute URL: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_errors_are_flagged_local() {
        assert!(ApiError::MissingCredential.is_local());
        assert!(ApiError::EmptyBatch.is_local());
        assert!(ApiError::validation("comment", "must not be empty").is_local());
        assert!(!ApiError::Network(TransportError::new("refused")).is_local());
        assert!(!ApiError::HttpStatus {
            status: 400,
            body: String::new()
        }
        .is_local());
    }

    #[test]
    fn http_status_only_for_status_errors() {
        let err = ApiError::HttpStatus {
            status: 403,
            body: r#"{"error_code":21301}"#.to_string(),
        };
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(ApiError::MissingCredential.http_status(), None);
    }

    #[test]
    fn display_messages() {
        let err = ApiError::BatchSizeExceeded { max: 20, actual: 21 };
        assert_eq!(
            err.to_string(),
            "id batch holds 21 ids, endpoint accepts at most 20"
        );
        let err = ApiError::validation("uid", "must not be empty");
        assert_eq!(err.to_string(), "invalid `uid`: must not be empty");
        let err = ApiError::from(TransportError::timeout("read timed out"));
        assert_eq!(err.to_string(), "network failure: read timed out");
    }

    #[test]
    fn transport_timeout_flag() {
        assert!(TransportError::timeout("slow").is_timeout());
        assert!(!TransportError::new("refused").is_timeout());
    }
}
