use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Backend, model registry and dispatch configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// OpenAI-compatible local endpoint (Ollama, llama.cpp, vLLM, ...)
    #[serde(default)]
    pub local: LocalBackendConfig,
    /// Hosted Anthropic Messages API
    #[serde(default)]
    pub hosted: HostedBackendConfig,
    /// Per-call defaults applied by the dispatcher
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Registry overrides keyed by symbolic model name
    ///
    /// Entries replace the built-in entry of the same name; unknown names
    /// are added to the registry.
    #[serde(default)]
    pub models: IndexMap<String, ModelEntryConfig>,
}

/// Which backend a model is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// OpenAI-compatible local endpoint
    Local,
    /// Hosted Anthropic API
    Hosted,
}

impl BackendKind {
    /// Stable lowercase name used in logs and API payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Hosted => "hosted",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local backend connection settings
///
/// Unset values are resolved from `LOCAL_OPENAI_BASE_URL` and
/// `LOCAL_OPENAI_API_KEY` when the backend is constructed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalBackendConfig {
    /// Base URL including the version prefix, e.g. `http://127.0.0.1:11434/v1`
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Bearer token sent in the `Authorization` header
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// Hosted backend connection settings
///
/// Unset values are resolved from `ANTHROPIC_BASE_URL` and
/// `ANTHROPIC_API_KEY` when the backend is constructed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostedBackendConfig {
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// API key sent in the `x-api-key` header
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// Generation defaults and the per-call wall-clock budget
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Sampling temperature forwarded on every call
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens forwarded on every call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Wall-clock timeout for one backend call (e.g. "600s", "10m")
    #[serde(default = "default_timeout", deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout: default_timeout(),
        }
    }
}

const fn default_temperature() -> f64 {
    0.2
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

/// One model registry entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntryConfig {
    /// Backend that serves the model
    pub backend: BackendKind,
    /// Provider-specific model identifier
    pub model: String,
}
