//! In-process stub ThunderBase server for integration tests.
//!
//! Serves the REST routes over an in-memory store, records every request,
//! and pushes change frames to connected WebSocket clients the way the real
//! server does: `{"collection", "event", "data"}` after each write, plus a
//! welcome frame on connect.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// Frames fanned out to every WebSocket client.
#[derive(Debug, Clone)]
enum Push {
    Text(String),
    Close,
}

struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    records: Mutex<BTreeMap<String, BTreeMap<u64, Value>>>,
    next_id: AtomicU64,
    push_tx: broadcast::Sender<Push>,
    ws_clients: AtomicUsize,
    reject_ws: AtomicBool,
}

/// A running stub server bound to `127.0.0.1:0`.
pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

// ============================================================================
// StubServer
// ============================================================================

impl StubServer {
    /// Starts the server in a background task.
    pub async fn start() -> anyhow::Result<Self> {
        init_tracing();

        let (push_tx, _) = broadcast::channel(64);
        let state = Arc::new(StubState {
            requests: Mutex::new(Vec::new()),
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            push_tx,
            ws_clients: AtomicUsize::new(0),
            reject_ws: AtomicBool::new(false),
        });

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .fallback(rest_handler)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
        })
    }

    /// Inserts a record without emitting a change frame.
    pub fn seed(&self, collection: &str, id: u64, record: Value) {
        self.state
            .records
            .lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Sends a raw text frame to every WebSocket client.
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.state.push_tx.send(Push::Text(text.into()));
    }

    /// Sends a JSON frame to every WebSocket client.
    pub fn push(&self, frame: Value) {
        self.push_text(frame.to_string());
    }

    /// Closes every WebSocket client from the server side.
    pub fn close_sockets(&self) {
        let _ = self.state.push_tx.send(Push::Close);
    }

    /// Answers new WebSocket upgrades with 503 while `reject` is set.
    /// Sockets already open are unaffected.
    pub fn reject_websockets(&self, reject: bool) {
        self.state.reject_ws.store(reject, Ordering::SeqCst);
    }

    /// Returns the number of WebSocket clients currently connected.
    pub fn ws_client_count(&self) -> usize {
        self.state.ws_clients.load(Ordering::SeqCst)
    }

    /// Waits until exactly `count` WebSocket clients are connected.
    pub async fn wait_for_ws_clients(&self, count: usize) -> anyhow::Result<()> {
        for _ in 0..200 {
            if self.ws_client_count() == count {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!(
            "expected {count} websocket clients, have {}",
            self.ws_client_count()
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn ws_handler(State(state): State<Arc<StubState>>, ws: WebSocketUpgrade) -> Response {
    if state.reject_ws.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    // Subscribe before the upgrade completes so no push is missed.
    let rx = state.push_tx.subscribe();
    ws.on_upgrade(move |socket| run_socket(state, socket, rx))
}

async fn run_socket(state: Arc<StubState>, socket: WebSocket, mut rx: broadcast::Receiver<Push>) {
    state.ws_clients.fetch_add(1, Ordering::SeqCst);

    let (mut sender, mut receiver) = socket.split();
    let welcome = json!({ "message": "Welcome to ThunderBase!" }).to_string();

    if sender.send(Message::Text(welcome.into())).await.is_ok() {
        loop {
            tokio::select! {
                push = rx.recv() => match push {
                    Ok(Push::Text(text)) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(Push::Close) | Err(_) => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                },
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    state.ws_clients.fetch_sub(1, Ordering::SeqCst);
}

async fn rest_handler(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };

    state.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: parsed_body.clone(),
    });

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        (_, ["broken", ..]) => (StatusCode::OK, "this is not json").into_response(),
        ("GET", [collection]) => list(&state, collection),
        ("POST", [collection]) => create(&state, collection, parsed_body),
        ("GET", [collection, id]) => get_one(&state, collection, id),
        ("PATCH", [collection, id]) => update(&state, collection, id, parsed_body),
        ("DELETE", [collection, id]) => delete(&state, collection, id),
        _ => not_found(),
    }
}

// ============================================================================
// Store Operations
// ============================================================================

fn list(state: &StubState, collection: &str) -> Response {
    let records = state.records.lock();
    let rows: Vec<Value> = records
        .get(collection)
        .map(|rows| rows.values().cloned().collect())
        .unwrap_or_default();
    (StatusCode::OK, axum::Json(Value::Array(rows))).into_response()
}

fn create(state: &StubState, collection: &str, body: Option<Value>) -> Response {
    let Some(Value::Object(mut fields)) = body else {
        return bad_request();
    };

    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    fields.insert("id".into(), json!(id));
    let record = Value::Object(fields);

    state
        .records
        .lock()
        .entry(collection.to_string())
        .or_default()
        .insert(id, record.clone());

    emit(state, collection, "INSERT", &record);
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

fn get_one(state: &StubState, collection: &str, id: &str) -> Response {
    let record = parse_id(id).and_then(|id| {
        state
            .records
            .lock()
            .get(collection)
            .and_then(|rows| rows.get(&id).cloned())
    });

    match record {
        Some(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        None => not_found(),
    }
}

fn update(state: &StubState, collection: &str, id: &str, body: Option<Value>) -> Response {
    let (Some(id), Some(Value::Object(patch))) = (parse_id(id), body) else {
        return bad_request();
    };

    let updated = {
        let mut records = state.records.lock();
        let Some(Value::Object(fields)) = records
            .get_mut(collection)
            .and_then(|rows| rows.get_mut(&id))
        else {
            return not_found();
        };
        fields.extend(patch);
        Value::Object(fields.clone())
    };

    emit(state, collection, "UPDATE", &updated);
    (StatusCode::OK, axum::Json(updated)).into_response()
}

fn delete(state: &StubState, collection: &str, id: &str) -> Response {
    let removed = parse_id(id).and_then(|id| {
        state
            .records
            .lock()
            .get_mut(collection)
            .and_then(|rows| rows.remove(&id))
    });

    match removed {
        Some(record) => {
            emit(state, collection, "DELETE", &record);
            let deleted = record["id"].clone();
            (StatusCode::OK, axum::Json(json!({ "deleted": deleted }))).into_response()
        }
        None => not_found(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn emit(state: &StubState, collection: &str, event: &str, data: &Value) {
    let frame = json!({ "collection": collection, "event": event, "data": data });
    let _ = state.push_tx.send(Push::Text(frame.to_string()));
}

fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, axum::Json(json!({ "error": "not found" }))).into_response()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": "bad request" }))).into_response()
}

/// Installs a test subscriber once; honors `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
