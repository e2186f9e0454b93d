//! Tool registry and the `/tools` endpoints
//!
//! Tools are typed handlers registered once at startup. Each registered tool
//! gets its own `POST /tools/{name}` route.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::StatusCode;
use indexmap::IndexMap;
use modelmux_core::HttpError;
use modelmux_llm::{Dispatcher, Message, TagSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::error_response;

/// Arguments passed to a tool call
pub type ToolArgs = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing required parameters: {0:?}")]
    MissingParameters(Vec<String>),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The tool ran and failed; the message is shown to the caller
    #[error("{0}")]
    Failed(String),
}

impl HttpError for ToolError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingParameters(_) | Self::InvalidArgument { .. } => "invalid_request_error",
            Self::Failed(_) => "tool_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Declared tool parameter
#[derive(Debug, Clone, Serialize)]
pub struct ToolParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &[ToolParameter];

    /// Run the tool; required parameters are already known to be present
    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError>;
}

/// Name-ordered set of tools, built once at startup
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `route`, `list_models` and `chat` tools
    pub fn builtin(dispatcher: &Dispatcher) -> Self {
        let mut registry = Self::new();
        registry.register(RouteTool {
            dispatcher: dispatcher.clone(),
        });
        registry.register(ListModelsTool {
            dispatcher: dispatcher.clone(),
        });
        registry.register(ChatTool {
            dispatcher: dispatcher.clone(),
        });
        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_owned();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!(tool = %name, "replaced previously registered tool");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build `GET /tools` plus one `POST /tools/{name}` route per tool
    pub fn router(&self) -> Router {
        let catalog: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters(),
                })
            })
            .collect();
        let catalog = Arc::new(Value::Array(catalog));

        let mut router = Router::new().route(
            "/tools",
            routing::get(move || {
                let catalog = Arc::clone(&catalog);
                async move { Json(catalog.as_ref().clone()) }
            }),
        );

        for (name, tool) in &self.tools {
            let tool = Arc::clone(tool);
            router = router.route(
                &format!("/tools/{name}"),
                routing::post(move |body: Result<Json<ToolRequest>, JsonRejection>| {
                    invoke(Arc::clone(&tool), body)
                }),
            );
        }

        router
    }
}

#[derive(Debug, Deserialize)]
struct ToolRequest {
    #[serde(default)]
    args: ToolArgs,
}

/// Handle `POST /tools/{name}`
async fn invoke(tool: Arc<dyn Tool>, body: Result<Json<ToolRequest>, JsonRejection>) -> Response {
    let args = match body {
        Ok(Json(request)) => request.args,
        Err(rejection) => {
            return error_response(&ToolError::InvalidArgument {
                name: "args".to_owned(),
                reason: rejection.body_text(),
            });
        }
    };

    if let Err(e) = check_required(tool.parameters(), &args) {
        return error_response(&e);
    }

    match tool.call(&args).await {
        Ok(result) => Json(serde_json::json!({"status": "success", "result": result})).into_response(),
        Err(e) => {
            tracing::warn!(tool = %tool.name(), error = %e, "tool call failed");
            error_response(&e)
        }
    }
}

fn check_required(parameters: &[ToolParameter], args: &ToolArgs) -> Result<(), ToolError> {
    let missing: Vec<String> = parameters
        .iter()
        .filter(|param| param.required && !args.contains_key(param.name))
        .map(|param| param.name.to_owned())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolError::MissingParameters(missing))
    }
}

fn string_arg<'a>(args: &'a ToolArgs, name: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ToolError::InvalidArgument {
            name: name.to_owned(),
            reason: "expected a string".to_owned(),
        }),
    }
}

fn tags_arg(args: &ToolArgs, name: &str) -> Result<TagSet, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(TagSet::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|_| ToolError::InvalidArgument {
            name: name.to_owned(),
            reason: "expected an array of strings".to_owned(),
        }),
    }
}

// -- Built-in tools --

const ROUTE_PARAMS: &[ToolParameter] = &[ToolParameter {
    name: "tags",
    description: "Routing tags, e.g. [\"code\", \"alt\"]",
    required: true,
}];

/// Report which backend and model a tag set selects
struct RouteTool {
    dispatcher: Dispatcher,
}

#[async_trait]
impl Tool for RouteTool {
    fn name(&self) -> &str {
        "route"
    }

    fn description(&self) -> &str {
        "Show the backend and model selected for a set of routing tags"
    }

    fn parameters(&self) -> &[ToolParameter] {
        ROUTE_PARAMS
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let tags = tags_arg(args, "tags")?;
        serde_json::to_value(self.dispatcher.route(&tags)).map_err(|e| ToolError::Failed(e.to_string()))
    }
}

struct ListModelsTool {
    dispatcher: Dispatcher,
}

#[async_trait]
impl Tool for ListModelsTool {
    fn name(&self) -> &str {
        "list_models"
    }

    fn description(&self) -> &str {
        "List the symbolic model names and the backend model each resolves to"
    }

    fn parameters(&self) -> &[ToolParameter] {
        &[]
    }

    async fn call(&self, _args: &ToolArgs) -> Result<Value, ToolError> {
        let models: Vec<Value> = self
            .dispatcher
            .router()
            .registry()
            .iter()
            .map(|(name, entry)| serde_json::json!({"name": name, "backend": entry.backend, "model": entry.model}))
            .collect();
        Ok(Value::Array(models))
    }
}

const CHAT_PARAMS: &[ToolParameter] = &[
    ToolParameter {
        name: "prompt",
        description: "User message",
        required: true,
    },
    ToolParameter {
        name: "tags",
        description: "Routing tags",
        required: false,
    },
    ToolParameter {
        name: "system",
        description: "Optional system instruction",
        required: false,
    },
];

/// One routed chat call returning the reply text
struct ChatTool {
    dispatcher: Dispatcher,
}

#[async_trait]
impl Tool for ChatTool {
    fn name(&self) -> &str {
        "chat"
    }

    fn description(&self) -> &str {
        "Send a prompt to the model selected by the tags and return its reply"
    }

    fn parameters(&self) -> &[ToolParameter] {
        CHAT_PARAMS
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let prompt = string_arg(args, "prompt")?.unwrap_or_default();
        let tags = tags_arg(args, "tags")?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = string_arg(args, "system")? {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        let response = self
            .dispatcher
            .chat(&messages, &tags)
            .await
            .map_err(|e| ToolError::Failed(e.client_message()))?;

        Ok(response.first_content().map_or(Value::Null, |text| Value::String(text.to_owned())))
    }
}
