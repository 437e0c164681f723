//! Response envelope and status classification.
//!
//! Every method-call response, JSON or multipart, ends up in
//! [`decode_response`]. The checks run in a fixed order: status, envelope,
//! `ok` flag, then the result shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::value::{RawValue, Value};

use crate::error::ApiError;

/// The JSON wrapper around every method-call result.
///
/// `result` stays a borrowed raw slice of the body until the caller's target
/// type is known, so it is decoded exactly once. The diagnostic fields are
/// lenient: a value of the wrong type reads as `None` and never turns an
/// `ok: false` reply into a protocol failure.
#[derive(Debug, Deserialize)]
pub struct Envelope<'a> {
    pub ok: bool,
    #[serde(borrow, default)]
    pub result: Option<&'a RawValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub error_code: Option<i64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Classify a fully read response and decode its result into `T`.
///
/// `body` must be the complete response body; it is copied into any error
/// returned.
pub fn decode_response<T: DeserializeOwned>(
    status: u16,
    reason: &str,
    body: &str,
) -> Result<T, ApiError> {
    if !(200..=299).contains(&status) {
        return Err(ApiError::HttpStatus {
            status,
            reason: reason.to_string(),
            body: body.to_string(),
        });
    }

    let envelope: Envelope<'_> = serde_json::from_str(body).map_err(|source| ApiError::Protocol {
        source,
        body: body.to_string(),
    })?;

    if !envelope.ok {
        return Err(ApiError::Application {
            error_code: envelope.error_code,
            description: envelope.description.or(envelope.message),
            body: body.to_string(),
        });
    }

    let result = envelope.result.map_or("null", RawValue::get);
    serde_json::from_str(result).map_err(|source| ApiError::ResultShape {
        source,
        body: body.to_string(),
    })
}
