use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Bearer token authentication configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether the token and user endpoints are active
    #[serde(default)]
    pub enabled: bool,

    /// HMAC secret used to sign access tokens
    pub secret: SecretString,

    /// Lifetime of issued access tokens (e.g. "30m")
    #[serde(default = "default_token_ttl", deserialize_with = "crate::duration::deserialize")]
    pub token_ttl: Duration,

    /// Require a valid token on the chat, tool and agent routes
    #[serde(default)]
    pub require_token: bool,

    /// Allow `POST /register` to create users at runtime
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,

    /// Users available at startup
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// A user seeded into the in-memory store
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub username: String,
    /// Argon2 hash in PHC string format
    pub password_hash: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

const fn default_token_ttl() -> Duration {
    Duration::from_secs(30 * 60)
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_registration() -> bool {
    true
}
