//! Single call surface: route by tags, then forward to the chosen backend

use std::sync::Arc;

use modelmux_config::{BackendKind, LlmConfig};

use crate::backend::{Backend, HostedBackend, LocalBackend};
use crate::error::LlmError;
use crate::policy::RoutingPolicy;
use crate::registry::ModelRegistry;
use crate::router::{BackendSelection, Router};
use crate::types::{ChatParams, ChatResponse, Message, TagSet};

/// Routes each call with [`Router::pick`] and forwards it unchanged
///
/// Cheap to clone; all clones share the same router and backend clients.
/// Backend errors propagate as-is: there is no retry and no fallback to the
/// other backend.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    router: Router,
    local: Arc<dyn Backend>,
    hosted: Arc<dyn Backend>,
    params: ChatParams,
}

impl Dispatcher {
    pub fn new(router: Router, local: Arc<dyn Backend>, hosted: Arc<dyn Backend>, params: ChatParams) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                router,
                local,
                hosted,
                params,
            }),
        }
    }

    /// Build the registry, router and both backend clients from configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the registry and policy disagree
    /// or a backend cannot be constructed.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let registry = ModelRegistry::from_config(&config.models);
        let router = Router::new(registry, &RoutingPolicy::standard())?;

        let timeout = config.dispatch.timeout;
        let local = LocalBackend::new(&config.local, timeout)?;
        let hosted = HostedBackend::new(&config.hosted, timeout)?;

        tracing::info!(
            local = %local.base_url(),
            hosted = %hosted.base_url(),
            models = router.registry().len(),
            "dispatcher ready"
        );

        Ok(Self::new(
            router,
            Arc::new(local),
            Arc::new(hosted),
            ChatParams::from(&config.dispatch),
        ))
    }

    /// Select a backend and model without contacting either backend
    pub fn route(&self, tags: &TagSet) -> BackendSelection {
        self.inner.router.pick(tags)
    }

    /// Route `messages` by `tags` and execute one chat call
    pub async fn chat(&self, messages: &[Message], tags: &TagSet) -> Result<ChatResponse, LlmError> {
        let selection = self.inner.router.pick(tags);

        tracing::debug!(
            backend = %selection.backend,
            model = %selection.model_id,
            symbol = %selection.symbol,
            rule = %selection.rule,
            tags = %tags,
            "dispatching chat"
        );

        let result = self
            .backend(selection.backend)
            .chat(&selection.model_id, messages, &self.inner.params)
            .await;

        if let Err(ref error) = result {
            tracing::warn!(
                backend = %selection.backend,
                model = %selection.model_id,
                error = %error,
                "chat failed"
            );
        }

        result
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    pub fn params(&self) -> &ChatParams {
        &self.inner.params
    }

    fn backend(&self, kind: BackendKind) -> &Arc<dyn Backend> {
        match kind {
            BackendKind::Local => &self.inner.local,
            BackendKind::Hosted => &self.inner.hosted,
        }
    }
}
