use indexmap::IndexMap;
use serde::Deserialize;

/// Agents keyed by the name used in their endpoint paths
pub type AgentsConfig = IndexMap<String, AgentConfig>;

/// A named prompt recipe runnable over HTTP
///
/// `instructions` becomes the system message of the conversation. Any
/// `{name}` placeholder in it is replaced by the matching context variable
/// supplied with the run request.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Human-readable description shown by `GET /agents`
    #[serde(default)]
    pub description: String,
    /// System prompt template
    pub instructions: String,
    /// Routing tags always applied when this agent runs
    #[serde(default)]
    pub tags: Vec<String>,
}
