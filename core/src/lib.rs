//! Synchronous client core for the Telegram Bot API.
//!
//! # Overview
//! [`ApiClient`] turns method calls into HTTP requests against a
//! token-scoped endpoint, unwraps the `{ ok, result }` envelope and decodes
//! the result into whatever type the caller asks for. File uploads go out as
//! multipart forms through the same response handling; downloads stream raw
//! bytes straight into a caller-supplied writer.
//!
//! # Design
//! - The HTTP client is injected through [`Transport`]; a `ureq::Agent`
//!   implementation is provided and used by default.
//! - [`ApiClient::call`] is generic over input and output, so any Bot API
//!   method can be called without a dedicated wrapper.
//! - Every failure category has its own [`ApiError`] variant carrying the
//!   raw status and body where there is one.
//! - Diagnostics go through `tracing`; the optional [`DebugSink`] receives
//!   each raw response body.

pub mod client;
pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod http;
pub mod multipart;
mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{ClientBuilder, Endpoints};
pub use debug::DebugSink;
pub use envelope::decode_response;
pub use error::ApiError;
pub use http::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use multipart::Multipart;
pub use types::{File, Message, ParseMode, User};
