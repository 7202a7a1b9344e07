//! Shared test utilities for integration tests: an in-process mock agent
//! service built with axum.

#![allow(dead_code)]

pub mod scripted;

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::{json, Value};

/// Agent whose invoke endpoint answers 500.
pub const BROKEN_AGENT: &str = "broken";
/// Agent whose stream ends with a server-sent error event.
pub const FAILING_AGENT: &str = "failing";
/// Agent that streams `SLOW_TOKENS` tokens, one every `SLOW_TOKEN_GAP`.
pub const SLOW_AGENT: &str = "slow";
pub const SLOW_TOKENS: usize = 6;
pub const SLOW_TOKEN_GAP: Duration = Duration::from_millis(400);
/// Agent whose stream carries a malformed message between two tokens.
pub const MALFORMED_AGENT: &str = "malformed";
/// Agent whose start-run response carries no run id.
pub const NO_ID_AGENT: &str = "no-id";
/// Run id returned by the mock service.
pub const RUN_ID: &str = "abc123";

/// Requests observed by the mock service.
#[derive(Default)]
pub struct MockState {
    pub status_calls: AtomicUsize,
    pub last_authorization: Mutex<Option<String>>,
    pub last_body: Mutex<Option<Value>>,
    pub last_run_id: Mutex<Option<String>>,
}

impl MockState {
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap, body: Option<&Value>) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *self.last_authorization.lock().unwrap() = auth;
        if let Some(body) = body {
            *self.last_body.lock().unwrap() = Some(body.clone());
        }
    }
}

pub fn service_info() -> Value {
    json!({
        "agents": [
            {"key": "research-assistant", "description": "A research assistant"},
            {"key": "chatbot", "description": "A simple chatbot"}
        ],
        "models": ["gpt-4o", "fake"],
        "default_agent": "research-assistant",
        "default_model": "gpt-4o"
    })
}

async fn info(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    state.record(&headers, None);
    Json(service_info())
}

async fn invoke(
    State(state): State<Arc<MockState>>,
    Path(agent): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers, Some(&body));
    if agent == BROKEN_AGENT {
        return (StatusCode::INTERNAL_SERVER_ERROR, "agent exploded").into_response();
    }
    let text = body["message"].as_str().unwrap_or("no message");
    Json(json!({
        "type": "ai",
        "content": format!("{agent}: {text}"),
        "run_id": "r-1"
    }))
    .into_response()
}

async fn stream(
    State(state): State<Arc<MockState>>,
    Path(agent): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers, Some(&body));
    let stream_tokens = body["stream_tokens"].as_bool().unwrap_or(true);

    if agent == SLOW_AGENT {
        let tokens = futures::stream::iter(0..SLOW_TOKENS).then(|_| async {
            tokio::time::sleep(SLOW_TOKEN_GAP).await;
            Ok::<_, Infallible>(
                Event::default().data(json!({"type": "token", "content": "x"}).to_string()),
            )
        });
        let done = futures::stream::once(async { Ok(Event::default().data("[DONE]")) });
        return Sse::new(tokens.chain(done)).into_response();
    }

    let mut payloads: Vec<String> = Vec::new();
    if stream_tokens {
        payloads.push(json!({"type": "token", "content": "Hel"}).to_string());
        payloads.push(json!({"type": "token", "content": "lo"}).to_string());
    }
    if agent == FAILING_AGENT {
        payloads.push(json!({"type": "error", "content": "model overloaded"}).to_string());
    } else if agent == MALFORMED_AGENT {
        payloads.push(json!({"type": "message", "content": "plain text"}).to_string());
        payloads.push(json!({"type": "token", "content": "!"}).to_string());
    } else {
        payloads.push(
            json!({"type": "message", "content": {"type": "ai", "content": "Hello"}}).to_string(),
        );
        payloads.push(json!({"type": "update", "content": {"step": 1}}).to_string());
        payloads.push("42".to_string());
    }
    payloads.push("[DONE]".to_string());

    let events = payloads
        .into_iter()
        .map(|data| Ok::<_, Infallible>(Event::default().data(data)));
    Sse::new(futures::stream::iter(events)).into_response()
}

async fn start_run(
    State(state): State<Arc<MockState>>,
    Path(agent): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers, Some(&body));
    if agent == NO_ID_AGENT {
        return Json(json!({"status": "accepted"}));
    }
    Json(json!({"run_id": RUN_ID}))
}

/// Reports pending, then running, then completed for every later call.
async fn run_status(
    State(state): State<Arc<MockState>>,
    Path((_agent, run_id)): Path<(String, String)>,
) -> Json<Value> {
    let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_run_id.lock().unwrap() = Some(run_id.clone());
    let status = ["pending", "running", "completed"][call.min(2)];
    Json(json!({
        "run_id": run_id,
        "status": status,
        "updated_at": "2024-05-01T12:00:00.123456",
        "error": null
    }))
}

async fn history(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_body.lock().unwrap() = Some(body.clone());
    if body["thread_id"] == "t-1" {
        Json(json!({"messages": [
            {"type": "human", "content": "hi"},
            {"type": "ai", "content": "hello there"}
        ]}))
    } else {
        Json(json!({"messages": []}))
    }
}

async fn feedback(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_body.lock().unwrap() = Some(body);
    Json(json!({"status": "success"}))
}

pub fn mock_router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/history", post(history))
        .route("/feedback", post(feedback))
        .route("/{agent}/invoke", post(invoke))
        .route("/{agent}/stream", post(stream))
        .route("/{agent}/runs", post(start_run))
        .route("/{agent}/runs/{run_id}", get(run_status))
        .with_state(state)
}

/// Start the mock service on a random port. Returns the base URL, the
/// observed state and a handle to shut it down.
pub async fn start_mock_service() -> (String, Arc<MockState>, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let state = Arc::new(MockState::default());
    let app = mock_router(state.clone());

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, state, handle)
}

/// Start the mock service on its own thread and runtime, for tests that
/// drive the blocking client from a plain (non-async) test.
pub fn start_mock_service_on_thread() -> (String, Arc<MockState>) {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let (base_url, state, handle) = start_mock_service().await;
            tx.send((base_url, state)).unwrap();
            let _ = handle.await;
        });
    });
    rx.recv().unwrap()
}
