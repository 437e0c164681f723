//! Endpoint templates and client construction.
//!
//! # Design
//! Both endpoint families are a base prefix followed directly by the token
//! and a path segment: `{bot}{token}/{method}` and
//! `{file}{token}/{file_path}`. The prefixes are plain strings so tests and
//! self-hosted Bot API servers can point the client anywhere.

use std::fmt;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::debug::DebugSink;
use crate::error::ApiError;
use crate::http::Transport;

pub const BOT_ENDPOINT: &str = "https://api.telegram.org/bot";
pub const FILE_ENDPOINT: &str = "https://api.telegram.org/file/bot";

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const BOT_ENDPOINT_VAR: &str = "TELEGRAM_BOT_ENDPOINT";
pub const FILE_ENDPOINT_VAR: &str = "TELEGRAM_FILE_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    bot: String,
    file: String,
}

impl Endpoints {
    pub fn new(bot: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            file: file.into(),
        }
    }

    pub fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}{token}/{method}", self.bot)
    }

    pub fn file_url(&self, token: &str, file_path: &str) -> String {
        format!("{}{token}/{file_path}", self.file)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(BOT_ENDPOINT, FILE_ENDPOINT)
    }
}

/// Builder for [`ApiClient`].
///
/// Without an explicit transport, `build` creates a `ureq::Agent` with
/// `http_status_as_error(false)`. The default debug sink forwards to
/// `tracing::debug!`.
pub struct ClientBuilder {
    token: String,
    endpoints: Endpoints,
    transport: Option<Arc<dyn Transport>>,
    debug: Option<DebugSink>,
}

impl ClientBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoints: Endpoints::default(),
            transport: None,
            debug: Some(DebugSink::default()),
        }
    }

    /// Read the token and optional endpoint overrides from the environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let token = lookup(TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{TOKEN_VAR} is not set")))?;
        let mut builder = Self::new(token.trim());
        if let Some(bot) = lookup(BOT_ENDPOINT_VAR) {
            builder = builder.bot_endpoint(bot);
        }
        if let Some(file) = lookup(FILE_ENDPOINT_VAR) {
            builder = builder.file_endpoint(file);
        }
        Ok(builder)
    }

    pub fn bot_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.bot = endpoint.into();
        self
    }

    pub fn file_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.file = endpoint.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    pub fn without_debug_sink(mut self) -> Self {
        self.debug = None;
        self
    }

    pub fn build(self) -> ApiClient {
        let transport = self.transport.unwrap_or_else(|| {
            let agent: ureq::Agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Arc::new(agent)
        });
        ApiClient::from_parts(transport, self.token, self.endpoints, self.debug)
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("endpoints", &self.endpoints)
            .field("custom_transport", &self.transport.is_some())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_endpoints_embed_token() {
        let ep = Endpoints::default();
        assert_eq!(
            ep.method_url("123:abc", "getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
        assert_eq!(
            ep.file_url("123:abc", "photos/file_1.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_1.jpg"
        );
    }

    #[test]
    fn from_env_requires_token() {
        let err = ClientBuilder::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        let err = ClientBuilder::from_lookup(lookup(&[(TOKEN_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_env_applies_overrides() {
        let builder = ClientBuilder::from_lookup(lookup(&[
            (TOKEN_VAR, "tok\n"),
            (BOT_ENDPOINT_VAR, "http://localhost:8081/bot"),
        ]))
        .unwrap();
        assert_eq!(builder.token, "tok");
        assert_eq!(
            builder.endpoints,
            Endpoints::new("http://localhost:8081/bot", FILE_ENDPOINT)
        );
    }
}
