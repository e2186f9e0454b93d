//! Backend trait and the two provider adapters

pub mod hosted;
pub mod local;

use std::time::Duration;

use async_trait::async_trait;
pub use hosted::HostedBackend;
pub use local::LocalBackend;
pub use modelmux_config::BackendKind;
use reqwest::Client;
use url::Url;

use crate::error::LlmError;
use crate::types::{ChatParams, ChatResponse, Message};

/// One chat completion against one provider
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single round trip and return the normalized result
    async fn chat(&self, model_id: &str, messages: &[Message], params: &ChatParams)
    -> Result<ChatResponse, LlmError>;
}

/// HTTP client with the per-call wall-clock budget applied
pub(crate) fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Resolve a base URL: explicit config, then `var`, then `default`
pub(crate) fn resolve_base_url(configured: Option<&Url>, var: &str, default: &str) -> Result<Url, LlmError> {
    if let Some(url) = configured {
        return Ok(url.clone());
    }

    let raw = non_empty_env(var).unwrap_or_else(|| default.to_owned());
    Url::parse(&raw).map_err(|e| LlmError::Configuration(format!("{var} is not a valid URL ({raw}): {e}")))
}

/// Read an environment variable, treating an empty value as unset
pub(crate) fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

/// Join a path segment onto a base URL that may or may not end in `/`
pub(crate) fn endpoint(base_url: &Url, path: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    format!("{base}/{path}")
}
