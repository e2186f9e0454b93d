//! Mock local and hosted backends for integration tests
//!
//! Both record every request body and header map so tests can assert on
//! exactly what modelmux forwarded.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// One request as seen by a mock backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<Recorded>>,
    fail: AtomicBool,
}

impl MockState {
    fn record(&self, headers: HeaderMap, body: serde_json::Value) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(Recorded { headers, body });
        }
    }
}

/// A mock backend server bound to a random local port
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockBackend {
    /// OpenAI-compatible backend answering `POST /v1/chat/completions`
    pub async fn local() -> anyhow::Result<Self> {
        Self::start(Router::new().route("/v1/chat/completions", routing::post(local_chat))).await
    }

    /// Anthropic-style backend answering `POST /v1/messages`
    pub async fn hosted() -> anyhow::Result<Self> {
        Self::start(Router::new().route("/v1/messages", routing::post(hosted_messages))).await
    }

    async fn start(router: Router<Arc<MockState>>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = router.with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including the `/v1` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Answer every following request with a 500
    pub fn fail_all(&self) {
        self.state.fail.store(true, Ordering::Relaxed);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn local_chat(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<serde_json::Value>) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    state.record(headers, body);

    if state.fail.load(Ordering::Relaxed) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "local model crashed").into_response();
    }

    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": format!("local reply from {model}")},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
    }))
    .into_response()
}

async fn hosted_messages(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    state.record(headers, body);

    if state.fail.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "type": "error",
                "error": {"type": "api_error", "message": "upstream exploded"}
            })),
        )
            .into_response();
    }

    Json(serde_json::json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "model": model,
        "content": [{"type": "text", "text": format!("hosted reply from {model}")}],
        "stop_reason": "end_turn"
    }))
    .into_response()
}
