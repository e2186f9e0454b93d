use std::time::Duration;

use http::StatusCode;
use modelmux_core::HttpError;
use thiserror::Error;

/// Errors produced while routing or executing a chat call
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing credential or inconsistent registry/policy
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local backend answered with a non-2xx status
    #[error("local backend returned {status}: {body}")]
    BackendHttp { status: StatusCode, body: String },

    /// Hosted backend rejected the call
    #[error("hosted backend returned {status} ({kind}): {message}")]
    BackendProvider {
        status: StatusCode,
        /// Provider error type, e.g. `authentication_error`
        kind: String,
        message: String,
    },

    /// The call exceeded its wall-clock budget
    #[error("backend call timed out after {}s", after.as_secs())]
    Timeout { after: Duration },

    /// Connection-level failure (refused, DNS, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// 2xx reply that is not in the expected shape
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// Caller input rejected before any backend was contacted
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Classify a `reqwest` failure, separating timeouts from transport errors
    pub(crate) fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout { after: timeout }
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendHttp { .. } | Self::BackendProvider { .. } | Self::Transport(_) | Self::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Configuration(_) => "internal_error",
            Self::BackendHttp { .. } | Self::Transport(_) | Self::MalformedResponse(_) => "upstream_error",
            Self::BackendProvider { kind, .. } => kind,
            Self::Timeout { .. } => "timeout_error",
            Self::InvalidRequest(_) => "invalid_request_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Configuration(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
