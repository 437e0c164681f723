//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are described as plain data, as in the original
//! host-does-IO layout, but the client now drives the round trip itself
//! through an injected [`Transport`]. The client never configures the
//! transport: timeouts, proxies, TLS and cancellation all live behind this
//! trait, and any error it returns is passed through untouched.
//!
//! Response bodies are readers rather than strings so the download path can
//! stream raw bytes without buffering them.

use std::fmt;
use std::io::{Cursor, Read};

/// Error type produced by a [`Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    /// Status text, e.g. `"Unauthorized"`. Empty when the status is unknown.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    /// Build a response around an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = ureq::http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default();
        Self {
            status,
            reason: reason.to_string(),
            headers: Vec::new(),
            body: Box::new(Cursor::new(body.into())),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Executes a single HTTP round trip.
///
/// Implementations must hand back every response they receive, whatever its
/// status: status interpretation belongs to the client. Only failures to
/// obtain a response at all (connection refused, timeout, cancellation)
/// should be returned as `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/x".to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn from_bytes_fills_reason() {
        let mut resp = HttpResponse::from_bytes(401, "nope");
        assert_eq!(resp.reason, "Unauthorized");
        let mut body = String::new();
        resp.body.read_to_string(&mut body).unwrap();
        assert_eq!(body, "nope");
    }

    #[test]
    fn from_bytes_unknown_status_has_empty_reason() {
        let resp = HttpResponse::from_bytes(599, Vec::new());
        assert_eq!(resp.reason, "");
    }
}
