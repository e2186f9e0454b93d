//! OpenAI-compatible local backend (Ollama, llama.cpp server, vLLM, ...)

use std::time::Duration;

use async_trait::async_trait;
use modelmux_config::LocalBackendConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::Backend;
use crate::error::LlmError;
use crate::protocol::openai::LocalChatRequest;
use crate::types::{ChatParams, ChatResponse, Message};

/// Default local endpoint (Ollama's OpenAI-compatible API)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434/v1";

/// Bearer token used when none is configured; Ollama ignores its value
pub const DEFAULT_API_KEY: &str = "ollama";

pub const BASE_URL_ENV: &str = "LOCAL_OPENAI_BASE_URL";
pub const API_KEY_ENV: &str = "LOCAL_OPENAI_API_KEY";

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct LocalBackend {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    timeout: Duration,
}

impl LocalBackend {
    /// Create from configuration, falling back to the environment
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the resolved base URL is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: &LocalBackendConfig, timeout: Duration) -> Result<Self, LlmError> {
        let base_url = super::resolve_base_url(config.base_url.as_ref(), BASE_URL_ENV, DEFAULT_BASE_URL)?;

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .unwrap_or_else(|| {
                super::non_empty_env(API_KEY_ENV)
                    .unwrap_or_else(|| DEFAULT_API_KEY.to_owned())
                    .into()
            });

        Ok(Self {
            client: super::http_client(timeout)?,
            base_url,
            api_key,
            timeout,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        super::endpoint(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn chat(
        &self,
        model_id: &str,
        messages: &[Message],
        params: &ChatParams,
    ) -> Result<ChatResponse, LlmError> {
        let body = LocalChatRequest {
            model: model_id,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(backend = "local", model = %model_id, error = %e, "backend request failed");
                LlmError::from_reqwest(&e, self.timeout)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(backend = "local", model = %model_id, status = %status, "backend returned error");
            return Err(LlmError::BackendHttp { status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LlmError::from_reqwest(&e, self.timeout))?;

        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| LlmError::MalformedResponse(format!("failed to parse local response: {e}")))?;

        if parsed.choices.is_empty() {
            return Err(LlmError::MalformedResponse("local response has no choices".to_owned()));
        }

        Ok(parsed)
    }
}
