//! Symbolic model names and the backend/model each resolves to

use indexmap::IndexMap;
use modelmux_config::{BackendKind, ModelEntryConfig};
use serde::Serialize;

/// Where a symbolic model name is served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub backend: BackendKind,
    /// Provider-specific model identifier
    pub model: String,
}

const STANDARD_MODELS: &[(&str, BackendKind, &str)] = &[
    ("general_local", BackendKind::Local, "llama3.1"),
    ("code_qwen", BackendKind::Local, "qwen2.5-coder:7b"),
    ("code_ds", BackendKind::Local, "deepseek-coder:6.7b"),
    ("code_cl", BackendKind::Local, "codellama:7b-instruct"),
    ("code_sc", BackendKind::Local, "starcoder2:7b"),
    ("claude_general", BackendKind::Hosted, "claude-3-5-sonnet"),
    ("claude_code", BackendKind::Hosted, "claude-3-5-sonnet"),
];

/// Immutable symbol table built once at startup
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: IndexMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// The built-in model table
    pub fn standard() -> Self {
        let entries = STANDARD_MODELS
            .iter()
            .map(|(name, backend, model)| {
                (
                    (*name).to_owned(),
                    ModelEntry {
                        backend: *backend,
                        model: (*model).to_owned(),
                    },
                )
            })
            .collect();

        Self { entries }
    }

    /// The built-in table with configured entries layered on top
    pub fn from_config(overrides: &IndexMap<String, ModelEntryConfig>) -> Self {
        let mut registry = Self::standard();

        for (name, entry) in overrides {
            tracing::debug!(symbol = %name, backend = %entry.backend, model = %entry.model, "model registry override");
            registry.entries.insert(
                name.clone(),
                ModelEntry {
                    backend: entry.backend,
                    model: entry.model.clone(),
                },
            );
        }

        registry
    }

    pub fn get(&self, symbol: &str) -> Option<&ModelEntry> {
        self.entries.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
