use http::StatusCode;
use modelmux_core::HttpError;

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Bearer token failed signature, format or expiry checks
    #[error("Could not validate credentials")]
    InvalidToken,

    /// No bearer token on a route that requires one
    #[error("Not authenticated")]
    MissingToken,

    /// The account exists but is disabled
    #[error("Inactive user")]
    InactiveUser,

    /// Registration with a username that is already taken
    #[error("Username already registered")]
    UserExists,

    /// Registration is turned off in configuration
    #[error("Registration is disabled")]
    RegistrationClosed,

    /// Password hashing or hash parsing failed
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Token issuance failed
    #[error("token issuance failed: {0}")]
    Signing(String),

    /// Authentication is not enabled on this server
    #[error("Authentication is disabled")]
    Disabled,
}

impl AuthError {
    /// Whether the response should carry `WWW-Authenticate: Bearer`
    pub const fn challenges(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::InvalidToken | Self::MissingToken)
    }
}

impl HttpError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InactiveUser | Self::UserExists => StatusCode::BAD_REQUEST,
            Self::RegistrationClosed => StatusCode::FORBIDDEN,
            Self::Hashing(_) | Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Disabled => StatusCode::NOT_FOUND,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::MissingToken => "authentication_error",
            Self::InactiveUser | Self::UserExists => "invalid_request_error",
            Self::RegistrationClosed => "permission_error",
            Self::Hashing(_) | Self::Signing(_) => "internal_error",
            Self::Disabled => "not_found_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Hashing(_) | Self::Signing(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
