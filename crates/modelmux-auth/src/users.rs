use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use modelmux_config::UserConfig;
use serde::{Deserialize, Serialize};

use crate::{AuthError, password};

/// Account as exposed to API consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub disabled: bool,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory user table shared by all requests
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<String, StoredUser>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from configured users
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if a configured hash is not a PHC string
    /// and `AuthError::UserExists` on duplicate usernames
    pub fn from_config(users: &[UserConfig]) -> Result<Self, AuthError> {
        let store = Self::new();

        for config in users {
            password::check_format(&config.password_hash)?;
            store.insert(StoredUser {
                user: User {
                    username: config.username.clone(),
                    full_name: config.full_name.clone(),
                    email: config.email.clone(),
                    disabled: config.disabled,
                },
                password_hash: config.password_hash.clone(),
            })?;
        }

        tracing::debug!(count = store.len(), "seeded user store");
        Ok(store)
    }

    /// Create a new enabled account, hashing its password
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserExists` when the username is taken
    pub fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        if self.users.contains_key(&new_user.username) {
            return Err(AuthError::UserExists);
        }

        let password_hash = password::hash(&new_user.password)?;
        let user = User {
            username: new_user.username,
            full_name: new_user.full_name,
            email: new_user.email,
            disabled: false,
        };

        self.insert(StoredUser {
            user: user.clone(),
            password_hash,
        })?;

        tracing::info!(username = %user.username, "registered user");
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// Disabled accounts are rejected after the password check so a wrong
    /// password never reveals the account state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` or `AuthError::InactiveUser`
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(stored) = self.users.get(username).map(|entry| entry.value().clone()) else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(password, &stored.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if stored.user.disabled {
            return Err(AuthError::InactiveUser);
        }

        Ok(stored.user)
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|entry| entry.user.clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn insert(&self, stored: StoredUser) -> Result<(), AuthError> {
        match self.users.entry(stored.user.username.clone()) {
            Entry::Occupied(_) => Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                slot.insert(stored);
                Ok(())
            }
        }
    }
}
