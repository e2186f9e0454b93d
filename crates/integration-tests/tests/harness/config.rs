//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use modelmux_config::{AgentConfig, AuthConfig, Config, UserConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config listening on an ephemeral port
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        Self { config }
    }

    /// Point the local backend at a mock
    pub fn with_local(mut self, base_url: &str) -> Self {
        self.config.llm.local.base_url = Some(base_url.parse().expect("valid URL"));
        self.config.llm.local.api_key = Some(SecretString::from("local-test-key"));
        self
    }

    /// Point the hosted backend at a mock
    pub fn with_hosted(mut self, base_url: &str) -> Self {
        self.config.llm.hosted.base_url = Some(base_url.parse().expect("valid URL"));
        self.config.llm.hosted.api_key = Some(SecretString::from("sk-ant-test"));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.llm.dispatch.timeout = timeout;
        self
    }

    pub fn with_agent(mut self, name: &str, instructions: &str, tags: &[&str]) -> Self {
        self.config.agents.insert(
            name.to_owned(),
            AgentConfig {
                description: format!("{name} agent"),
                instructions: instructions.to_owned(),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            },
        );
        self
    }

    /// Enable token auth with an optional preconfigured user
    pub fn with_auth(mut self, require_token: bool, users: Vec<UserConfig>) -> Self {
        self.config.auth = Some(AuthConfig {
            enabled: true,
            secret: SecretString::from("integration-secret"),
            token_ttl: Duration::from_secs(300),
            require_token,
            allow_registration: true,
            users,
        });
        self
    }

    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
