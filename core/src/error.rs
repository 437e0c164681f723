//! Error types for the Bot API client.
//!
//! # Design
//! Each failure category gets its own variant so callers can tell "the call
//! failed" (`HttpStatus`, `Application`) from "the call succeeded but the
//! result did not have the shape I asked for" (`ResultShape`). Variants that
//! come from a response keep the raw body, which is usually the only useful
//! diagnostic for a remote-side rejection.

use crate::http::BoxError;

/// Errors returned by [`crate::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request input could not be serialized to JSON. Nothing was sent.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport could not produce a response (connection, timeout,
    /// cancellation). The transport's own error is kept as the source.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status outside 200..=299.
    #[error("unexpected response: {status}: {reason} [{body}]")]
    HttpStatus {
        status: u16,
        reason: String,
        body: String,
    },

    /// 2xx response whose body is not a valid envelope.
    #[error("unable to parse response: {source}")]
    Protocol {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The envelope reported `ok: false`.
    #[error("operation failed: {body}")]
    Application {
        error_code: Option<i64>,
        description: Option<String>,
        body: String,
    },

    /// The envelope reported success but `result` does not fit the
    /// requested type.
    #[error("unexpected result shape: {source}")]
    ResultShape {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// Local stream failure while reading a response body, assembling an
    /// upload or copying a download into its sink.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file descriptor has no path, so it cannot be downloaded.
    #[error("file {file_id} has no download path")]
    MissingFilePath { file_id: String },

    /// Invalid or missing client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status for [`ApiError::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, for the variants that come from a response.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { body, .. }
            | ApiError::Protocol { body, .. }
            | ApiError::Application { body, .. }
            | ApiError::ResultShape { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_carries_status_and_body() {
        let err = ApiError::HttpStatus {
            status: 429,
            reason: "Too Many Requests".to_string(),
            body: r#"{"ok":false,"error_code":429}"#.to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("Too Many Requests"));
        assert!(text.contains(r#"{"ok":false,"error_code":429}"#));
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn application_display_carries_body() {
        let err = ApiError::Application {
            error_code: None,
            description: None,
            body: r#"{"ok":false}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"operation failed: {"ok":false}"#);
        assert_eq!(err.body(), Some(r#"{"ok":false}"#));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn local_errors_have_no_body() {
        let err = ApiError::MissingFilePath {
            file_id: "abc".to_string(),
        };
        assert!(err.body().is_none());
        assert_eq!(err.to_string(), "file abc has no download path");
    }
}
