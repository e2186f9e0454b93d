//! Anthropic Messages API backend

use std::time::Duration;

use async_trait::async_trait;
use modelmux_config::HostedBackendConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::Backend;
use crate::convert::anthropic::to_hosted_request;
use crate::error::LlmError;
use crate::protocol::anthropic::{HostedErrorResponse, HostedResponse};
use crate::types::{ChatParams, ChatResponse, Message};

/// Default Anthropic API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Client for the hosted Messages API
///
/// Construction succeeds without a key; every call then fails with
/// `LlmError::Configuration` before any network traffic.
pub struct HostedBackend {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl HostedBackend {
    /// Create from configuration, falling back to the environment
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the resolved base URL is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: &HostedBackendConfig, timeout: Duration) -> Result<Self, LlmError> {
        let base_url = super::resolve_base_url(config.base_url.as_ref(), BASE_URL_ENV, DEFAULT_BASE_URL)?;

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .or_else(|| super::non_empty_env(API_KEY_ENV).map(SecretString::from));

        if api_key.is_none() {
            tracing::warn!("{API_KEY_ENV} is not set, hosted models will be unavailable");
        }

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

    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn messages_url(&self) -> String {
        super::endpoint(&self.base_url, "messages")
    }
}

#[async_trait]
impl Backend for HostedBackend {
    async fn chat(
        &self,
        model_id: &str,
        messages: &[Message],
        params: &ChatParams,
    ) -> Result<ChatResponse, LlmError> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::Configuration(format!("{API_KEY_ENV} is not set")));
        };

        let wire_request = to_hosted_request(model_id, messages, params);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(backend = "hosted", model = %model_id, error = %e, "backend request failed");
                LlmError::from_reqwest(&e, self.timeout)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(backend = "hosted", model = %model_id, status = %status, "backend returned error");

            let (kind, message) = match serde_json::from_str::<HostedErrorResponse>(&body) {
                Ok(envelope) => (envelope.error.kind, envelope.error.message),
                Err(_) => ("api_error".to_owned(), body),
            };

            return Err(LlmError::BackendProvider { status, kind, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LlmError::from_reqwest(&e, self.timeout))?;

        let parsed: HostedResponse = serde_json::from_slice(&bytes)
            .map_err(|e| LlmError::MalformedResponse(format!("failed to parse hosted response: {e}")))?;

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn backend(base_url: &str, api_key: Option<&str>) -> HostedBackend {
        let config = HostedBackendConfig {
            base_url: Some(Url::parse(base_url).unwrap()),
            api_key: api_key.map(|k| SecretString::from(k.to_owned())),
        };
        HostedBackend::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_messages_request_and_normalizes_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_json(serde_json::json!({
                "model": "claude-3-5-sonnet",
                "max_tokens": 2048,
                "temperature": 0.2,
                "system": "Be terse.",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "claude-3-5-sonnet",
                "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "text", "text": "there"}
                ],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 4, "output_tokens": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = backend(&server.uri(), Some("sk-ant-test"))
            .chat(
                "claude-3-5-sonnet",
                &[Message::system("Be terse."), Message::user("hi")],
                &ChatParams::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"choices": [{"message": {"role": "assistant", "content": "Hello there"}}]})
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_contacting_provider() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = temp_env::with_var_unset(API_KEY_ENV, || backend(&server.uri(), None));
        assert!(!backend.has_api_key());

        let err = backend
            .chat("claude-3-5-sonnet", &[Message::user("hi")], &ChatParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Configuration(_)));
    }

    #[tokio::test]
    async fn provider_error_keeps_provider_kind() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let err = backend(&server.uri(), Some("bad"))
            .chat("claude-3-5-sonnet", &[Message::user("hi")], &ChatParams::default())
            .await
            .unwrap_err();

        match err {
            LlmError::BackendProvider { status, kind, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(kind, "authentication_error");
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unstructured_error_body_is_kept_as_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = backend(&server.uri(), Some("k"))
            .chat("claude-3-5-sonnet", &[Message::user("hi")], &ChatParams::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LlmError::BackendProvider { ref kind, ref message, .. } if kind == "api_error" && message == "overloaded"
        ));
    }

    #[tokio::test]
    async fn reply_without_text_is_empty_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "tool_use", "id": "tu_1", "name": "lookup", "input": {}}]
            })))
            .mount(&server)
            .await;

        let result = backend(&server.uri(), Some("k"))
            .chat("claude-3-5-sonnet", &[Message::user("hi")], &ChatParams::default())
            .await
            .unwrap();

        assert_eq!(result.first_content(), Some(""));
    }

    #[test]
    fn key_and_url_resolve_from_environment() {
        let vars = [
            (API_KEY_ENV, Some("sk-ant-env")),
            (BASE_URL_ENV, Some("http://proxy.internal/anthropic/v1")),
        ];
        temp_env::with_vars(vars, || {
            let backend = HostedBackend::new(&HostedBackendConfig::default(), Duration::from_secs(1)).unwrap();
            assert!(backend.has_api_key());
            assert_eq!(backend.base_url().as_str(), "http://proxy.internal/anthropic/v1");
        });
    }

    #[test]
    fn default_base_url() {
        temp_env::with_vars_unset([API_KEY_ENV, BASE_URL_ENV], || {
            let backend = HostedBackend::new(&HostedBackendConfig::default(), Duration::from_secs(1)).unwrap();
            assert!(!backend.has_api_key());
            assert_eq!(backend.base_url().as_str(), "https://api.anthropic.com/v1");
        });
    }
}
