//! Configured agents and the `/agents` endpoints

use std::sync::{Arc, OnceLock};

use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::StatusCode;
use indexmap::IndexMap;
use modelmux_config::AgentsConfig;
use modelmux_core::HttpError;
use modelmux_llm::{Dispatcher, LlmError, Message, TagSet};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::error_response;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent {0} not found")]
    NotFound(String),

    #[error("Agent execution failed: missing context variable '{0}'")]
    MissingVariable(String),

    #[error("Agent execution failed: {0}")]
    InvalidRequest(String),

    #[error("Agent execution failed: {}", .0.client_message())]
    Chat(#[from] LlmError),
}

impl HttpError for AgentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingVariable(_) | Self::InvalidRequest(_) | Self::Chat(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::NotFound(_) => "not_found_error",
            Self::MissingVariable(_) | Self::InvalidRequest(_) => "invalid_request_error",
            Self::Chat(_) => "agent_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// A named instruction template with default routing tags
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub tags: TagSet,
    /// `{placeholder}` names found in the instructions, in first-seen order
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AgentInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    description: &'a str,
    args: &'a [String],
    tags: &'a TagSet,
}

impl Agent {
    fn info(&self, with_name: bool) -> AgentInfo<'_> {
        AgentInfo {
            name: with_name.then_some(self.name.as_str()),
            description: &self.description,
            args: &self.args,
            tags: &self.tags,
        }
    }

    /// Fill `{var}` placeholders from the context variables
    ///
    /// String values are inserted verbatim, other JSON values in their JSON
    /// text form.
    pub fn render_instructions(&self, context: &Map<String, Value>) -> Result<String, AgentError> {
        let mut missing = None;

        let rendered = placeholder().replace_all(&self.instructions, |caps: &Captures<'_>| {
            let key = &caps[1];
            match context.get(key) {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => {
                    missing.get_or_insert_with(|| key.to_owned());
                    String::new()
                }
            }
        });

        match missing {
            Some(key) => Err(AgentError::MissingVariable(key)),
            None => Ok(rendered.into_owned()),
        }
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("must be valid regex"))
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    query: String,
    #[serde(default)]
    tags: TagSet,
    #[serde(default)]
    context_variables: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub result: String,
    pub messages: Vec<Message>,
    pub agent_name: String,
}

/// Agents from configuration, keyed by name
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: IndexMap<String, Arc<Agent>>,
}

impl AgentRegistry {
    pub fn from_config(config: &AgentsConfig) -> Self {
        let agents = config
            .iter()
            .map(|(name, agent)| {
                let mut args: Vec<String> = Vec::new();
                for caps in placeholder().captures_iter(&agent.instructions) {
                    let arg = caps[1].to_owned();
                    if !args.contains(&arg) {
                        args.push(arg);
                    }
                }

                let agent = Agent {
                    name: name.clone(),
                    description: agent.description.clone(),
                    instructions: agent.instructions.clone(),
                    tags: agent.tags.iter().cloned().collect(),
                    args,
                };
                (name.clone(), Arc::new(agent))
            })
            .collect();

        Self { agents }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Agent>> {
        self.agents.get(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Build the listing routes plus one `POST /agents/{name}/run` per agent
    pub fn router(&self, dispatcher: &Dispatcher) -> Router {
        let catalog = Arc::new(self.clone());

        let mut router = Router::new()
            .route(
                "/agents",
                routing::get({
                    let catalog = Arc::clone(&catalog);
                    move || list(Arc::clone(&catalog))
                }),
            )
            .route(
                "/agents/{name}",
                routing::get(move |Path(name): Path<String>| describe(Arc::clone(&catalog), name)),
            );

        for (name, agent) in &self.agents {
            let agent = Arc::clone(agent);
            let dispatcher = dispatcher.clone();
            router = router.route(
                &format!("/agents/{name}/run"),
                routing::post(move |body: Result<Json<RunRequest>, JsonRejection>| {
                    run_handler(Arc::clone(&agent), dispatcher.clone(), body)
                }),
            );
        }

        router
    }
}

/// Run an agent: instructions as the system turn, the query as the user turn
///
/// Routing uses the union of the agent's tags and the request's tags.
///
/// # Errors
///
/// Returns `AgentError::MissingVariable` if a placeholder has no value and
/// `AgentError::Chat` if the backend call fails
pub async fn run(
    agent: &Agent,
    dispatcher: &Dispatcher,
    query: &str,
    tags: &TagSet,
    context: &Map<String, Value>,
) -> Result<AgentResponse, AgentError> {
    let instructions = agent.render_instructions(context)?;
    let mut messages = vec![Message::system(instructions), Message::user(query)];
    let tags = agent.tags.union(tags);

    tracing::debug!(agent = %agent.name, tags = %tags, "running agent");

    let response = dispatcher.chat(&messages, &tags).await?;
    let result = response.first_content().unwrap_or_default().to_owned();
    messages.push(Message::assistant(result.clone()));

    Ok(AgentResponse {
        result,
        messages,
        agent_name: agent.name.clone(),
    })
}

/// Handle `GET /agents`
async fn list(registry: Arc<AgentRegistry>) -> Response {
    let body: IndexMap<&str, AgentInfo<'_>> = registry
        .agents
        .iter()
        .map(|(name, agent)| (name.as_str(), agent.info(false)))
        .collect();

    Json(body).into_response()
}

/// Handle `GET /agents/{name}`
async fn describe(registry: Arc<AgentRegistry>, name: String) -> Response {
    match registry.get(&name) {
        Some(agent) => Json(agent.info(true)).into_response(),
        None => error_response(&AgentError::NotFound(name)),
    }
}

/// Handle `POST /agents/{name}/run`
async fn run_handler(
    agent: Arc<Agent>,
    dispatcher: Dispatcher,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(&AgentError::InvalidRequest(rejection.body_text())),
    };

    match run(&agent, &dispatcher, &request.query, &request.tags, &request.context_variables).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::warn!(agent = %agent.name, error = %e, "agent run failed");
            error_response(&e)
        }
    }
}
