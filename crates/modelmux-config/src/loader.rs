use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    ///
    /// With no file every backend setting comes from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file fails to load
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse and validate configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_dispatch()?;
        self.validate_agents()?;
        self.validate_auth()?;
        Ok(())
    }

    fn validate_dispatch(&self) -> anyhow::Result<()> {
        let dispatch = &self.llm.dispatch;

        if !(0.0..=2.0).contains(&dispatch.temperature) {
            anyhow::bail!(
                "llm.dispatch.temperature must be between 0.0 and 2.0, got {}",
                dispatch.temperature
            );
        }

        if dispatch.max_tokens == 0 {
            anyhow::bail!("llm.dispatch.max_tokens must be greater than 0");
        }

        if dispatch.timeout.is_zero() {
            anyhow::bail!("llm.dispatch.timeout must be greater than 0");
        }

        for (name, entry) in &self.llm.models {
            if entry.model.trim().is_empty() {
                anyhow::bail!("llm.models.{name}.model must not be empty");
            }
        }

        Ok(())
    }

    fn validate_agents(&self) -> anyhow::Result<()> {
        for name in self.agents.keys() {
            if !is_route_segment(name) {
                anyhow::bail!("agent name '{name}' may only contain ASCII letters, digits, '_' and '-'");
            }
        }
        Ok(())
    }

    fn validate_auth(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.auth else {
            return Ok(());
        };

        if !auth.enabled {
            return Ok(());
        }

        if auth.secret.expose_secret().is_empty() {
            anyhow::bail!("auth.secret must not be empty when auth is enabled");
        }

        if auth.token_ttl.is_zero() {
            anyhow::bail!("auth.token_ttl must be greater than 0");
        }

        Ok(())
    }
}

/// Agent names become literal path segments in `/agents/{name}/run`
fn is_route_segment(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
