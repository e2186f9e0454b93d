//! Axum route handlers for the chat, route and model listing endpoints

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use modelmux_config::BackendKind;
use modelmux_core::HttpError;
use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::error::LlmError;
use crate::types::{Message, TagSet};

/// Build the `/v1` router
pub fn llm_router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/v1/chat", routing::post(chat))
        .route("/v1/route", routing::post(route))
        .route("/v1/models", routing::get(list_models))
        .with_state(dispatcher)
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    messages: Vec<Message>,
    #[serde(default)]
    tags: TagSet,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    tags: TagSet,
}

#[derive(Debug, Serialize)]
struct ModelInfo<'a> {
    name: &'a str,
    backend: BackendKind,
    model: &'a str,
}

/// Handle `POST /v1/chat`
async fn chat(State(dispatcher): State<Dispatcher>, body: Result<Json<ChatBody>, JsonRejection>) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return error_response(&LlmError::InvalidRequest(rejection.body_text())),
    };

    if body.messages.is_empty() {
        return error_response(&LlmError::InvalidRequest("messages must not be empty".to_owned()));
    }

    match dispatcher.chat(&body.messages, &body.tags).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handle `POST /v1/route`
async fn route(State(dispatcher): State<Dispatcher>, body: Result<Json<RouteBody>, JsonRejection>) -> Response {
    match body {
        Ok(Json(body)) => Json(dispatcher.route(&body.tags)).into_response(),
        Err(rejection) => error_response(&LlmError::InvalidRequest(rejection.body_text())),
    }
}

/// Handle `GET /v1/models`
async fn list_models(State(dispatcher): State<Dispatcher>) -> Response {
    let models: Vec<ModelInfo<'_>> = dispatcher
        .router()
        .registry()
        .iter()
        .map(|(name, entry)| ModelInfo {
            name,
            backend: entry.backend,
            model: &entry.model,
        })
        .collect();

    Json(serde_json::json!({ "data": models })).into_response()
}

/// Render any domain error as a `{"error": {...}}` JSON response
pub fn error_response<E: HttpError>(error: &E) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::warn!(error = %error, status = %status, "request failed");
    }

    (status, Json(error.error_body())).into_response()
}
