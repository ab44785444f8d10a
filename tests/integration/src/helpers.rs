//! Test helpers for integration tests
//!
//! Spawns an in-process mock of the comment backend: the paginated snapshot
//! endpoint, the write endpoints the dispatcher hits, and the
//! `/ws/comments/{ticket}/` event stream. Tests script the stream by
//! broadcasting directives to whatever connection is currently attached.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// What the test wants the attached stream connection to do next
#[derive(Debug, Clone)]
pub enum WsDirective {
    /// Send a text frame to the client
    Frame(String),
    /// Close the connection with a code
    Close(u16),
    /// Drop the connection without a close handshake (the client observes
    /// this as an abnormal 1006-style closure)
    Abort,
}

/// Mutable backend state shared with the route handlers
#[derive(Debug)]
pub struct MockState {
    /// Body served by the snapshot endpoint
    pub snapshot: Value,
    /// Next id handed to a created comment
    pub next_id: i64,
}

#[derive(Clone)]
struct AppState {
    directives: broadcast::Sender<WsDirective>,
    state: Arc<Mutex<MockState>>,
}

/// In-process mock comment backend
pub struct MockBackend {
    pub addr: SocketAddr,
    directives: broadcast::Sender<WsDirective>,
    state: Arc<Mutex<MockState>>,
    _handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving the given snapshot body
    pub async fn start(snapshot: Value) -> Result<Self> {
        let (directives, _) = broadcast::channel(64);
        let state = Arc::new(Mutex::new(MockState {
            snapshot,
            next_id: 100,
        }));

        let app_state = AppState {
            directives: directives.clone(),
            state: Arc::clone(&state),
        };

        let app = Router::new()
            .route("/api/comments/", post(create_comment))
            .route("/api/comments/:id/", get(snapshot_page).delete(delete_comment))
            .route("/api/comments/:id/rate/", post(rate_comment))
            .route("/api/comments/download-document/:id/", get(download_document))
            .route("/ws/comments/:ticket/", get(ws_handler))
            .with_state(app_state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            directives,
            state,
            _handle: handle,
        })
    }

    /// Base URL for the REST side
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Push a text frame to the attached stream connection
    pub fn send_frame(&self, frame: impl Into<String>) {
        let _ = self.directives.send(WsDirective::Frame(frame.into()));
    }

    /// Close the attached stream connection with a code
    pub fn close_stream(&self, code: u16) {
        let _ = self.directives.send(WsDirective::Close(code));
    }

    /// Drop the attached stream connection without a close handshake
    pub fn drop_stream(&self) {
        let _ = self.directives.send(WsDirective::Abort);
    }

    /// Swap the snapshot body served to the next fetch
    pub async fn set_snapshot(&self, snapshot: Value) {
        self.state.lock().await.snapshot = snapshot;
    }
}

async fn snapshot_page(
    Path(_ticket): Path<i64>,
    State(app): State<AppState>,
) -> Json<Value> {
    Json(app.state.lock().await.snapshot.clone())
}

async fn create_comment(State(app): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = app.state.lock().await;
    let id = state.next_id;
    state.next_id += 1;

    Json(json!({
        "id": id,
        "parent": body.get("parent").cloned().unwrap_or(Value::Null),
        "user": {
            "id": body.get("user_id").cloned().unwrap_or(Value::Null),
            "full_name": "Test User"
        },
        "content": body.get("content").cloned().unwrap_or(Value::Null),
        "created_at": chrono::Utc::now().to_rfc3339(),
        "edited": false,
        "documents": [],
        "ratings": [],
        "replies": []
    }))
}

async fn rate_comment(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let rating = body.get("rating").cloned().unwrap_or(Value::Null);
    let user_id = body.get("user_id").cloned().unwrap_or(Value::Null);

    let ratings = if rating.is_null() {
        json!([])
    } else {
        json!([{"user_id": user_id, "rating": rating}])
    };

    Json(json!({
        "id": id,
        "content": "rated",
        "ratings": ratings
    }))
}

async fn delete_comment(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn download_document(Path(_id): Path<i64>) -> impl IntoResponse {
    (StatusCode::OK, b"%PDF-mock".to_vec())
}

async fn ws_handler(
    Path(_ticket): Path<i64>,
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = app.directives.subscribe();
    ws.on_upgrade(move |socket| drive_stream(socket, rx))
}

/// Forward scripted directives to the client until either side closes
async fn drive_stream(mut socket: WebSocket, mut rx: broadcast::Receiver<WsDirective>) {
    loop {
        tokio::select! {
            directive = rx.recv() => match directive {
                Ok(WsDirective::Frame(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                Ok(WsDirective::Close(code)) => {
                    let _ = socket
                        .send(Message::Close(Some(CloseFrame {
                            code,
                            reason: "".into(),
                        })))
                        .await;
                    return;
                }
                Ok(WsDirective::Abort) => {
                    // Drop the socket with no close frame at all
                    return;
                }
                Err(_) => return,
            },
            message = socket.recv() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            }
        }
    }
}

/// Poll a condition until it holds or the timeout elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
