//! [`Transport`] implementation for `ureq`.
//!
//! The agent is used exactly as the caller configured it. Agents built with
//! ureq's defaults turn 4xx/5xx into `Err` before the body is seen, so the
//! status and body never reach the envelope logic; build the agent with
//! `http_status_as_error(false)` (as [`crate::ApiClient::new`] does) to get
//! [`crate::ApiError::HttpStatus`] instead.

use ureq::RequestBuilder;

use crate::http::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport};

impl Transport for ureq::Agent {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        // GET still carries the JSON parameters in the body.
        let response = match (method, body) {
            (HttpMethod::Get, Some(body)) => with_headers(self.get(&url), &headers)
                .force_send_body()
                .send(&body[..]),
            (HttpMethod::Get, None) => with_headers(self.get(&url), &headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.post(&url), &headers).send(&body[..]),
            (HttpMethod::Post, None) => with_headers(self.post(&url), &headers).send_empty(),
        }?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
