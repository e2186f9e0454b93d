//! Tag-based backend selection

use modelmux_config::BackendKind;
use serde::Serialize;

use crate::error::LlmError;
use crate::policy::{Rule, RoutingPolicy, Trigger};
use crate::registry::ModelRegistry;
use crate::types::TagSet;

/// Outcome of routing one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSelection {
    pub backend: BackendKind,
    /// Provider-specific model identifier sent on the wire
    pub model_id: String,
    /// Symbolic registry name, e.g. `code_qwen`
    pub symbol: String,
    /// Name of the policy rule that matched
    pub rule: String,
}

/// A symbol already resolved against the registry
#[derive(Debug, Clone)]
struct Target {
    symbol: String,
    model_id: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    trigger: Trigger,
    backend: BackendKind,
    variants: Vec<(String, Target)>,
    default: Target,
}

impl CompiledRule {
    fn select(&self, tags: &TagSet) -> BackendSelection {
        let target = self
            .variants
            .iter()
            .find(|(tag, _)| tags.contains(tag))
            .map_or(&self.default, |(_, target)| target);

        BackendSelection {
            backend: self.backend,
            model_id: target.model_id.clone(),
            symbol: target.symbol.clone(),
            rule: self.name.clone(),
        }
    }
}

/// Holds the model registry and the policy and answers `pick`
///
/// Every symbol the policy can produce is resolved at construction, so
/// selection is a pure table walk that cannot fail.
#[derive(Debug, Clone)]
pub struct Router {
    registry: ModelRegistry,
    rules: Vec<CompiledRule>,
    fallback: CompiledRule,
}

impl Router {
    /// Validate `policy` against `registry` and build the router
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` when the policy references a symbol
    /// missing from the registry, a symbol whose backend differs from the
    /// rule's backend, or has no catch-all rule.
    pub fn new(registry: ModelRegistry, policy: &RoutingPolicy) -> Result<Self, LlmError> {
        let rules = policy
            .rules()
            .iter()
            .map(|rule| compile(&registry, rule))
            .collect::<Result<Vec<_>, _>>()?;

        let fallback = rules
            .iter()
            .find(|rule| rule.trigger == Trigger::Always)
            .cloned()
            .ok_or_else(|| LlmError::Configuration("routing policy has no catch-all rule".to_owned()))?;

        Ok(Self {
            registry,
            rules,
            fallback,
        })
    }

    /// Router over the built-in registry and policy
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the built-in tables disagree.
    pub fn standard() -> Result<Self, LlmError> {
        Self::new(ModelRegistry::standard(), &RoutingPolicy::standard())
    }

    /// Choose the backend and model for a tag set
    ///
    /// Deterministic and side-effect free; the first matching rule wins.
    pub fn pick(&self, tags: &TagSet) -> BackendSelection {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.trigger.matches(tags))
            .unwrap_or(&self.fallback);

        rule.select(tags)
    }

    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}

fn compile(registry: &ModelRegistry, rule: &Rule) -> Result<CompiledRule, LlmError> {
    let resolve = |symbol: &str| -> Result<Target, LlmError> {
        let entry = registry.get(symbol).ok_or_else(|| {
            LlmError::Configuration(format!("rule '{}' references unknown model '{symbol}'", rule.name))
        })?;

        if entry.backend != rule.backend {
            return Err(LlmError::Configuration(format!(
                "rule '{}' targets the {} backend but model '{symbol}' is served by {}",
                rule.name, rule.backend, entry.backend
            )));
        }

        Ok(Target {
            symbol: symbol.to_owned(),
            model_id: entry.model.clone(),
        })
    };

    let variants = rule
        .variants
        .iter()
        .map(|variant| Ok((variant.tag.clone(), resolve(&variant.symbol)?)))
        .collect::<Result<Vec<_>, LlmError>>()?;

    Ok(CompiledRule {
        name: rule.name.clone(),
        trigger: rule.trigger.clone(),
        backend: rule.backend,
        variants,
        default: resolve(&rule.default_symbol)?,
    })
}
