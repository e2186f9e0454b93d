use std::time::Duration;

use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::{AlgorithmExt, Claims as JwtClaims, Header, TimeOptions, UntrustedToken};
use modelmux_core::Claims;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::AuthError;

/// Response body of the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Issues and validates HS256 bearer tokens
pub struct TokenIssuer {
    key: Hs256Key,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        Self {
            key: Hs256Key::new(secret.expose_secret().as_bytes()),
            ttl,
        }
    }

    /// Sign a token for `username` that expires after the configured TTL
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the TTL is out of range or signing fails
    pub fn issue(&self, username: &str) -> Result<AccessToken, AuthError> {
        let ttl = chrono::Duration::from_std(self.ttl).map_err(|e| AuthError::Signing(e.to_string()))?;

        let claims = JwtClaims::new(Claims {
            subject: username.to_owned(),
        })
        .set_duration_and_issuance(&TimeOptions::default(), ttl);

        let access_token = Hs256
            .token(&Header::empty(), &claims, &self.key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// Verify signature and expiry and return the custom claims
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, forged or expired token
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| {
            tracing::debug!(error = %e, "unparseable bearer token");
            AuthError::InvalidToken
        })?;

        let token = Hs256.validator::<Claims>(&self.key).validate(&untrusted).map_err(|e| {
            tracing::debug!(error = %e, "bearer token failed validation");
            AuthError::InvalidToken
        })?;

        token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| {
                tracing::debug!(error = %e, "bearer token expired");
                AuthError::InvalidToken
            })?;

        Ok(token.claims().custom.clone())
    }
}
