//! In-memory fake of the Telegram Bot API.
//!
//! Serves `/bot{token}/{method}` with the usual `{ ok, result }` envelope and
//! `/file/bot{token}/{path}` with raw bytes of previously uploaded photos.
//! Parameters are read from a JSON body for every verb, or from a multipart
//! form for `sendPhoto` uploads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct StoredFile {
    pub file_id: String,
    pub file_path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct BotState {
    token: String,
    next_message_id: AtomicI64,
    files: RwLock<HashMap<String, StoredFile>>,
}

pub type Shared = Arc<BotState>;

pub fn app(token: &str) -> Router {
    let state: Shared = Arc::new(BotState {
        token: token.to_string(),
        next_message_id: AtomicI64::new(1),
        files: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/{bot_token}/{method}", any(dispatch))
        .route("/file/{bot_token}/{*path}", get(download))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn ok(result: Value) -> Response {
    Json(json!({ "ok": true, "result": result })).into_response()
}

fn failure(status: StatusCode, description: &str) -> Response {
    (
        status,
        Json(json!({
            "ok": false,
            "error_code": status.as_u16(),
            "description": description,
        })),
    )
        .into_response()
}

fn authorized(state: &BotState, bot_token: &str) -> bool {
    bot_token.strip_prefix("bot") == Some(state.token.as_str())
}

async fn dispatch(
    State(state): State<Shared>,
    Path((bot_token, method)): Path<(String, String)>,
    request: Request,
) -> Response {
    if !authorized(&state, &bot_token) {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    tracing::info!(%method, "bot api call");

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    if is_multipart {
        return match method.as_str() {
            "sendPhoto" => match Multipart::from_request(request, &state).await {
                Ok(form) => upload_photo(&state, form).await,
                Err(_) => failure(StatusCode::BAD_REQUEST, "Bad Request: invalid multipart form"),
            },
            _ => failure(StatusCode::BAD_REQUEST, "Bad Request: method does not accept files"),
        };
    }

    let body = match Bytes::from_request(request, &state).await {
        Ok(body) => body,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Bad Request: unreadable body"),
    };
    let params: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(params) => params,
            Err(_) => return failure(StatusCode::BAD_REQUEST, "Bad Request: invalid JSON"),
        }
    };

    match method.as_str() {
        "getMe" => ok(json!({
            "id": 1,
            "is_bot": true,
            "first_name": "Mock Bot",
            "username": "mock_bot",
        })),
        "sendMessage" => send_message(&state, &params),
        "sendPhoto" => send_photo_url(&state, &params),
        "getFile" => get_file(&state, &params).await,
        "setWebhook" => set_webhook(&params),
        _ => failure(StatusCode::NOT_FOUND, "Not Found"),
    }
}

/// Chat ids arrive as strings or numbers; anything unparsable maps to 0.
pub fn parse_chat_id(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}

fn message(state: &BotState, chat_id: i64) -> serde_json::Map<String, Value> {
    let date = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut msg = serde_json::Map::new();
    msg.insert(
        "message_id".to_string(),
        json!(state.next_message_id.fetch_add(1, Ordering::Relaxed)),
    );
    msg.insert("date".to_string(), json!(date));
    msg.insert("chat".to_string(), json!({ "id": chat_id, "type": "private" }));
    msg
}

fn send_message(state: &BotState, params: &Value) -> Response {
    let text = params["text"].as_str().unwrap_or_default();
    if text.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Bad Request: message text is empty");
    }
    let mut msg = message(state, parse_chat_id(&params["chat_id"]));
    msg.insert("text".to_string(), json!(text));
    ok(Value::Object(msg))
}

fn send_photo_url(state: &BotState, params: &Value) -> Response {
    let Some(photo) = params["photo"].as_str() else {
        return failure(StatusCode::BAD_REQUEST, "Bad Request: there is no photo in the request");
    };
    let mut msg = message(state, parse_chat_id(&params["chat_id"]));
    msg.insert(
        "photo".to_string(),
        json!([{ "file_id": photo, "width": 0, "height": 0 }]),
    );
    if let Some(caption) = params["caption"].as_str() {
        msg.insert("caption".to_string(), json!(caption));
    }
    ok(Value::Object(msg))
}

async fn upload_photo(state: &BotState, mut form: Multipart) -> Response {
    let mut photo = None;
    let mut chat_id = Value::Null;
    let mut caption = None;

    loop {
        let field = match form.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return failure(StatusCode::BAD_REQUEST, "Bad Request: invalid multipart form"),
        };
        let name = field.name().unwrap_or_default().to_string();
        let Ok(data) = field.bytes().await else {
            return failure(StatusCode::BAD_REQUEST, "Bad Request: invalid multipart form");
        };
        match name.as_str() {
            "photo" => photo = Some(data.to_vec()),
            "chat_id" => chat_id = Value::String(String::from_utf8_lossy(&data).into_owned()),
            "caption" => caption = Some(String::from_utf8_lossy(&data).into_owned()),
            _ => {}
        }
    }

    let Some(bytes) = photo else {
        return failure(StatusCode::BAD_REQUEST, "Bad Request: there is no photo in the request");
    };
    let file_id = Uuid::new_v4().simple().to_string();
    let stored = StoredFile {
        file_path: format!("photos/{file_id}.png"),
        file_id: file_id.clone(),
        bytes,
    };
    let size = stored.bytes.len();
    state.files.write().await.insert(file_id.clone(), stored);

    let mut msg = message(state, parse_chat_id(&chat_id));
    msg.insert(
        "photo".to_string(),
        json!([{ "file_id": file_id, "width": 0, "height": 0, "file_size": size }]),
    );
    if let Some(caption) = caption {
        msg.insert("caption".to_string(), json!(caption));
    }
    ok(Value::Object(msg))
}

async fn get_file(state: &BotState, params: &Value) -> Response {
    let file_id = params["file_id"].as_str().unwrap_or_default();
    let files = state.files.read().await;
    match files.get(file_id) {
        Some(file) => ok(json!({
            "file_id": file.file_id,
            "file_size": file.bytes.len(),
            "file_path": file.file_path,
        })),
        None => failure(StatusCode::BAD_REQUEST, "Bad Request: invalid file_id"),
    }
}

fn set_webhook(params: &Value) -> Response {
    match params["url"].as_str() {
        Some(url) if url.starts_with("https://") => ok(json!(true)),
        _ => failure(
            StatusCode::BAD_REQUEST,
            "Bad Request: bad webhook: An HTTPS URL must be provided for webhook",
        ),
    }
}

async fn download(
    State(state): State<Shared>,
    Path((bot_token, path)): Path<(String, String)>,
) -> Response {
    if !authorized(&state, &bot_token) {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    let files = state.files.read().await;
    match files.values().find(|f| f.file_path == path) {
        Some(file) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            file.bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
