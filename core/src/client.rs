//! Bot API client: generic dispatcher, multipart upload and file download.
//!
//! # Design
//! `ApiClient` holds the token, endpoint templates, an injected transport
//! and an optional debug sink, and is read-only once built. Every call
//! allocates its own request and buffers, so one client can be shared
//! across threads.
//!
//! JSON calls and multipart uploads both end in `handle_response`, which
//! owns the status and envelope checks. Downloads skip it entirely: the file
//! endpoint returns raw bytes, and those are copied to the sink untouched
//! whatever the status.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::{ClientBuilder, Endpoints};
use crate::debug::DebugSink;
use crate::envelope::decode_response;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::multipart::Multipart;
use crate::types::{File, Message, ParseMode, User};

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: String,
    endpoints: Endpoints,
    debug: Option<DebugSink>,
}

impl ApiClient {
    /// Client for the public Bot API over a default `ureq` agent.
    pub fn new(token: impl Into<String>) -> Self {
        ClientBuilder::new(token).build()
    }

    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        token: String,
        endpoints: Endpoints,
        debug: Option<DebugSink>,
    ) -> Self {
        Self {
            transport,
            token,
            endpoints,
            debug,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Replace the debug sink. `&mut self` keeps this from racing with calls
    /// that borrow the client; clones made earlier keep their old sink.
    pub fn set_debug_sink(&mut self, sink: Option<DebugSink>) {
        self.debug = sink;
    }

    /// Call `method` with `input` as the JSON body and decode the result.
    ///
    /// The body is sent for every verb, GET included; parameters never go
    /// into the query string.
    pub fn call<I, T>(&self, verb: HttpMethod, method: &str, input: &I) -> Result<T, ApiError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(input).map_err(ApiError::Serialization)?;
        debug!(method, verb = verb.as_str(), "calling bot api method");
        self.send(HttpRequest {
            method: verb,
            url: self.endpoints.method_url(&self.token, method),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Upload `content` as a multipart form: one binary part named
    /// `file_field`, then `fields` as text parts in the given order.
    ///
    /// The whole payload is read into memory before the request is sent, so
    /// a failing reader never leaves a half-sent request behind. Callers
    /// uploading large files should budget memory for the full content.
    pub fn upload_file<R, T>(
        &self,
        method: &str,
        file_field: &str,
        file_name: &str,
        content: &mut R,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        R: Read + ?Sized,
        T: DeserializeOwned,
    {
        self.upload_form(Multipart::new(), method, file_field, file_name, content, fields)
    }

    fn upload_form<R, T>(
        &self,
        mut form: Multipart,
        method: &str,
        file_field: &str,
        file_name: &str,
        content: &mut R,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        R: Read + ?Sized,
        T: DeserializeOwned,
    {
        let size = form.file(file_field, file_name, content)?;
        for (name, value) in fields {
            form.text(name, value);
        }
        debug!(method, size, "uploading multipart form");
        let content_type = form.content_type();
        self.send(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoints.method_url(&self.token, method),
            headers: vec![("content-type".to_string(), content_type)],
            body: Some(form.finish()),
        })
    }

    /// Stream the raw content of `file` into `sink`, returning the byte count.
    ///
    /// The response is not checked for status or envelope: whatever the file
    /// endpoint returns is copied as-is.
    pub fn download_file<W: Write + ?Sized>(&self, file: &File, sink: &mut W) -> Result<u64, ApiError> {
        let path = file
            .file_path
            .as_deref()
            .ok_or_else(|| ApiError::MissingFilePath {
                file_id: file.file_id.clone(),
            })?;
        debug!(file_id = %file.file_id, "downloading file");
        let mut response = self
            .transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: self.endpoints.file_url(&self.token, path),
                headers: Vec::new(),
                body: None,
            })
            .map_err(ApiError::Transport)?;
        Ok(std::io::copy(&mut response.body, sink)?)
    }

    pub fn get_me(&self) -> Result<User, ApiError> {
        self.call(HttpMethod::Get, "getMe", &json!({}))
    }

    /// Resolve `file_id` to a downloadable [`File`].
    pub fn get_file(&self, file_id: &str) -> Result<File, ApiError> {
        self.debugf(&format!("Fetching file with getFile: {file_id}"));
        self.call(HttpMethod::Get, "getFile", &json!({ "file_id": file_id }))
    }

    pub fn send_message(&self, chat_id: &str, text: &str) -> Result<Message, ApiError> {
        self.call(
            HttpMethod::Post,
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": text }),
        )
    }

    pub fn send_formatted_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<Message, ApiError> {
        self.call(
            HttpMethod::Post,
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": text, "parse_mode": parse_mode }),
        )
    }

    /// Send a message with a reply or inline keyboard attached.
    pub fn send_message_keyboard<K: Serialize + ?Sized>(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: &K,
    ) -> Result<Message, ApiError> {
        #[derive(Serialize)]
        struct Params<'a, K: ?Sized> {
            chat_id: &'a str,
            text: &'a str,
            reply_markup: &'a K,
        }
        self.call(
            HttpMethod::Post,
            "sendMessage",
            &Params {
                chat_id,
                text,
                reply_markup: keyboard,
            },
        )
    }

    /// Send a photo the server fetches from `url`.
    pub fn send_photo_url(&self, chat_id: &str, caption: &str, url: &str) -> Result<Message, ApiError> {
        self.call(
            HttpMethod::Post,
            "sendPhoto",
            &json!({ "chat_id": chat_id, "caption": caption, "photo": url }),
        )
    }

    /// Upload a photo from `photo`.
    pub fn send_photo<R: Read + ?Sized>(
        &self,
        chat_id: &str,
        caption: &str,
        photo: &mut R,
    ) -> Result<Message, ApiError> {
        self.upload_file(
            "sendPhoto",
            "photo",
            "photo.png",
            photo,
            &[("chat_id", chat_id), ("caption", caption)],
        )
    }

    /// Point the bot's update webhook at `https_url`.
    pub fn set_webhook(&self, https_url: &str) -> Result<bool, ApiError> {
        self.call(HttpMethod::Post, "setWebhook", &json!({ "url": https_url }))
    }

    fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.transport.execute(request).map_err(ApiError::Transport)?;
        self.handle_response(response)
    }

    fn handle_response<T: DeserializeOwned>(&self, mut response: HttpResponse) -> Result<T, ApiError> {
        let mut raw = Vec::new();
        response.body.read_to_end(&mut raw)?;
        let body = String::from_utf8_lossy(&raw);
        self.debugf(&format!("* API Response: {body}"));
        decode_response(response.status, &response.reason, &body)
    }

    fn debugf(&self, msg: &str) {
        if let Some(sink) = &self.debug {
            sink.emit(msg);
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("token", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
