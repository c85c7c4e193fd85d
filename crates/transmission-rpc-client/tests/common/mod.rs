//! An in-process stand-in for the Transmission daemon.
//!
//! It checks Basic credentials, hands out session ids on 409 rejections like the real daemon,
//! and records every RPC request it receives.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::{net::TcpListener, task::JoinHandle};
use transmission_rpc_client::SESSION_ID_HEADER;

pub const USERNAME: &str = "test";
pub const PASSWORD: &str = "test";

pub const CONFLICT_BODY: &str = "<h1>409: Conflict</h1>";
pub const UNAUTHORIZED_BODY: &str = "Not Authorized\n";

/// One request as seen by the daemon.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub session_id: Option<String>,
    pub body: String,
}

#[derive(Debug)]
struct DaemonState {
    authorization: String,
    session_id: String,
    issued: u32,
    reject_every_request: bool,
    reply_delay: Option<Duration>,
    reply: String,
    requests: Vec<RecordedRequest>,
    files: HashMap<String, Vec<u8>>,
}

impl DaemonState {
    fn rotate(&mut self) {
        self.issued += 1;
        self.session_id = format!("session-{}", self.issued);
    }
}

type SharedState = Arc<Mutex<DaemonState>>;

pub struct FakeDaemon {
    pub base_url: String,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeDaemon {
    /// Start a daemon answering every accepted RPC request with `reply`.
    pub async fn start(reply: &str) -> Self {
        let mut state = DaemonState {
            authorization: format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}"))),
            session_id: String::new(),
            issued: 0,
            reject_every_request: false,
            reply_delay: None,
            reply: reply.to_owned(),
            requests: Vec::new(),
            files: HashMap::new(),
        };
        state.rotate();
        let state = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/transmission/rpc", post(rpc))
            .route("/files/:name", get(file))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// The session id the daemon currently accepts.
    pub fn session_id(&self) -> String {
        self.state.lock().unwrap().session_id.clone()
    }

    /// Invalidate the current session id, as a daemon restart would.
    pub fn rotate_session_id(&self) {
        self.state.lock().unwrap().rotate();
    }

    /// Rotate the session id on every request, so that nothing is ever accepted.
    pub fn reject_every_request(&self) {
        self.state.lock().unwrap().reject_every_request = true;
    }

    /// Sleep for `delay` before answering each RPC request.
    pub fn delay_replies(&self, delay: Duration) {
        self.state.lock().unwrap().reply_delay = Some(delay);
    }

    pub fn set_reply(&self, reply: &str) {
        self.state.lock().unwrap().reply = reply.to_owned();
    }

    /// Serve `bytes` at `/files/<name>`.
    pub fn serve_file(&self, name: &str, bytes: &[u8]) -> String {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_owned(), bytes.to_vec());
        format!("{}/files/{name}", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn rpc(State(state): State<SharedState>, headers: HeaderMap, body: Bytes) -> Response {
    let delay = state.lock().unwrap().reply_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().unwrap();
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    state.requests.push(RecordedRequest {
        session_id: session_id.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if authorization != Some(state.authorization.as_str()) {
        return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response();
    }

    if state.reject_every_request {
        state.rotate();
    }
    if session_id.as_deref() != Some(state.session_id.as_str()) {
        return (
            StatusCode::CONFLICT,
            [(SESSION_ID_HEADER, state.session_id.clone())],
            CONFLICT_BODY,
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        state.reply.clone(),
    )
        .into_response()
}

async fn file(State(state): State<SharedState>, Path(name): Path<String>) -> Response {
    let bytes = state.lock().unwrap().files.get(&name).cloned();
    match bytes {
        Some(bytes) => (StatusCode::OK, bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
