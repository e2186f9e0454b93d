#![allow(clippy::must_use_candidate)]

pub mod agents;
pub mod auth;
mod duration;
mod env;
pub mod llm;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use agents::*;
pub use auth::*;
pub use llm::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level modelmux configuration
///
/// Every section is optional; an empty file (or no file at all) yields a
/// working setup whose backend endpoints and credentials are resolved from
/// the process environment when the backends are constructed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend, model registry and dispatch configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Named agents exposed over HTTP
    #[serde(default)]
    pub agents: AgentsConfig,
    /// Token authentication
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
