//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// Messages API request
#[derive(Debug, Clone, Serialize)]
pub struct HostedRequest {
    pub model: String,
    /// Required by the Messages API
    pub max_tokens: u32,
    pub temperature: f64,
    /// System prompt (top-level, not in messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<HostedMessage>,
}

/// Conversation turn; role is `user` or `assistant`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedMessage {
    pub role: &'static str,
    pub content: String,
}

// -- Response types --

/// Messages API response
///
/// Only the content blocks are read; ids, usage and stop reasons are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HostedResponse {
    pub content: Vec<HostedResponseBlock>,
}

/// Typed content block in a response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostedResponseBlock {
    Text {
        text: String,
    },
    /// `tool_use`, `thinking` and any block type added later
    #[serde(other)]
    Other,
}

// -- Error types --

/// Error envelope, e.g. `{"type":"error","error":{"type":"authentication_error","message":"..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct HostedErrorResponse {
    pub error: HostedErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}
