//! HTTP surface of modelmux: chat routing, tools, agents and token auth

mod agents;
mod auth;
mod error;
mod tools;

use std::net::SocketAddr;

use axum::response::IntoResponse;
use axum::{Router, routing};
use http::StatusCode;
use modelmux_auth::AuthService;
use modelmux_config::Config;
use modelmux_llm::Dispatcher;
use tower_http::trace::TraceLayer;

pub use agents::{Agent, AgentError, AgentRegistry, AgentResponse};
pub use auth::CurrentUser;
pub use error::AuthFailure;
pub use tools::{Tool, ToolArgs, ToolError, ToolParameter, ToolRegistry};

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8000);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher or the auth service cannot be
    /// constructed
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let dispatcher = Dispatcher::from_config(&config.llm)?;
        Self::with_dispatcher(config, dispatcher)
    }

    /// Build the server around an existing dispatcher
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service cannot be constructed
    pub fn with_dispatcher(config: &Config, dispatcher: Dispatcher) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address.unwrap_or(DEFAULT_LISTEN_ADDRESS);

        let auth = match config.auth {
            Some(ref auth_config) if auth_config.enabled => Some(AuthService::from_config(auth_config)?),
            _ => None,
        };

        let tools = ToolRegistry::builtin(&dispatcher);
        let agents = AgentRegistry::from_config(&config.agents);

        tracing::debug!(tools = tools.len(), agents = agents.len(), "registered endpoints");

        // Routes that may sit behind a bearer token
        let mut gated = Router::new()
            .merge(modelmux_llm::llm_router(dispatcher.clone()))
            .merge(tools.router())
            .merge(agents.router(&dispatcher));

        if let Some(ref service) = auth
            && service.require_token()
        {
            gated = gated.route_layer(axum::middleware::from_fn_with_state(
                service.clone(),
                auth::require_bearer,
            ));
        }

        let mut app = Router::new().merge(gated).merge(auth::auth_router(auth));

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, routing::get(health_handler));
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::Request;
    use modelmux_config::AuthConfig;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    fn config(auth: Option<AuthConfig>) -> Config {
        let mut config = Config::default();
        config.llm.local.base_url = Some("http://127.0.0.1:9/v1".parse().unwrap());
        config.llm.hosted.base_url = Some("http://127.0.0.1:9/v1".parse().unwrap());
        config.auth = auth;
        config
    }

    fn auth_config(require_token: bool) -> AuthConfig {
        AuthConfig {
            enabled: true,
            secret: SecretString::from("test-secret".to_owned()),
            token_ttl: std::time::Duration::from_secs(60),
            require_token,
            allow_registration: true,
            users: Vec::new(),
        }
    }

    async fn status(router: Router, request: Request<Body>) -> StatusCode {
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn health_is_served_on_configured_path() {
        let mut config = config(None);
        config.server.health.path = "/healthz".to_owned();
        let router = Server::new(&config).unwrap().into_router();

        let request = Request::get("/healthz").body(Body::empty()).unwrap();
        assert_eq!(status(router, request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_can_be_disabled() {
        let mut config = config(None);
        config.server.health.enabled = false;
        let router = Server::new(&config).unwrap().into_router();

        let request = Request::get("/health").body(Body::empty()).unwrap();
        assert_eq!(status(router, request).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn gated_routes_require_token_when_configured() {
        let router = Server::new(&config(Some(auth_config(true)))).unwrap().into_router();

        let request = Request::get("/v1/models").body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[http::header::WWW_AUTHENTICATE], "Bearer");

        let request = Request::get("/health").body(Body::empty()).unwrap();
        assert_eq!(status(router, request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn gated_routes_are_open_without_require_token() {
        let router = Server::new(&config(Some(auth_config(false)))).unwrap().into_router();

        let request = Request::get("/tools").body(Body::empty()).unwrap();
        assert_eq!(status(router, request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn auth_routes_report_disabled() {
        let router = Server::new(&config(None)).unwrap().into_router();

        let request = Request::get("/users/me").body(Body::empty()).unwrap();
        assert_eq!(status(router, request).await, StatusCode::NOT_FOUND);
    }

    #[test]
    fn default_listen_address() {
        let server = Server::new(&config(None)).unwrap();
        assert_eq!(server.listen_address(), "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
    }
}
