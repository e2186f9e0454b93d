//! Tag-based model routing for modelmux
//!
//! Maps caller-supplied routing tags to a `(backend, model)` pair, talks to
//! an OpenAI-compatible local endpoint or the hosted Anthropic Messages API,
//! and normalizes both replies into one `{"choices": [...]}` shape.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod convert;
pub mod dispatch;
pub mod error;
#[cfg(feature = "http")]
pub mod handler;
pub mod policy;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod types;

pub use backend::{Backend, BackendKind, HostedBackend, LocalBackend};
pub use dispatch::Dispatcher;
pub use error::LlmError;
#[cfg(feature = "http")]
pub use handler::llm_router;
pub use policy::{Rule, RoutingPolicy, Trigger, Variant};
pub use registry::{ModelEntry, ModelRegistry};
pub use router::{BackendSelection, Router};
pub use types::{ChatParams, ChatResponse, Choice, ChoiceMessage, Message, Role, TagSet};
