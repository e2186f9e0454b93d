use std::sync::Arc;

use modelmux_config::AuthConfig;

use crate::token::{AccessToken, TokenIssuer};
use crate::users::{NewUser, User, UserStore};
use crate::AuthError;

/// Users, token issuance and the auth policy, shared across handlers
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    users: UserStore,
    tokens: TokenIssuer,
    require_token: bool,
    allow_registration: bool,
}

impl AuthService {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a seeded user has a malformed hash or a
    /// duplicate username
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let users = UserStore::from_config(&config.users)?;

        Ok(Self {
            inner: Arc::new(AuthServiceInner {
                users,
                tokens: TokenIssuer::new(&config.secret, config.token_ttl),
                require_token: config.require_token,
                allow_registration: config.allow_registration,
            }),
        })
    }

    /// Whether model, tool and agent routes require a bearer token
    pub fn require_token(&self) -> bool {
        self.inner.require_token
    }

    /// Exchange credentials for an access token
    ///
    /// Password verification runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` or `AuthError::InactiveUser`
    pub async fn login(&self, username: String, password: String) -> Result<AccessToken, AuthError> {
        let inner = Arc::clone(&self.inner);
        let user = blocking(move || inner.users.authenticate(&username, &password)).await?;

        let token = self.inner.tokens.issue(&user.username)?;
        tracing::info!(username = %user.username, "issued access token");
        Ok(token)
    }

    /// Create a new account
    ///
    /// Password hashing runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RegistrationClosed` when registration is turned
    /// off and `AuthError::UserExists` when the name is taken
    pub async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        if !self.inner.allow_registration {
            return Err(AuthError::RegistrationClosed);
        }

        let inner = Arc::clone(&self.inner);
        blocking(move || inner.users.register(new_user)).await
    }

    /// Resolve a bearer token to an active user
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for bad tokens or unknown users and
    /// `AuthError::InactiveUser` for disabled accounts
    pub fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.inner.tokens.validate(token)?;

        let user = self.inner.users.get(&claims.subject).ok_or(AuthError::InvalidToken)?;

        if user.disabled {
            return Err(AuthError::InactiveUser);
        }

        Ok(user)
    }
}

/// Run Argon2 work off the async worker threads
async fn blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Hashing(format!("password task failed: {e}")))?
}
