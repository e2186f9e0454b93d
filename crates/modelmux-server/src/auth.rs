use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json, Router, routing};
use http::request::Parts;
use http::{HeaderMap, header};
use modelmux_auth::{AuthError, AuthService, NewUser, User};
use serde::Deserialize;

use crate::error::AuthFailure;

/// Auth routes share an optional service; `None` means auth is disabled
pub(crate) type AuthState = Option<AuthService>;

/// Build `/token`, `/register`, `/users/me` and `/protected`
pub(crate) fn auth_router(auth: AuthState) -> Router {
    Router::new()
        .route("/token", routing::post(token_handler))
        .route("/register", routing::post(register_handler))
        .route("/users/me", routing::get(me_handler))
        .route("/protected", routing::get(protected_handler))
        .with_state(auth)
}

/// Reject requests without a valid bearer token
///
/// On success the caller's [`User`] is attached to the request extensions,
/// where [`CurrentUser`] picks it up.
pub(crate) async fn require_bearer(State(auth): State<AuthService>, mut request: Request, next: Next) -> Response {
    let user = match authenticate(&auth, request.headers()) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), error = %e, "bearer authentication failed");
            return AuthFailure(e).into_response();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn authenticate(auth: &AuthService, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    auth.current_user(token)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The active user behind the request's bearer token
pub struct CurrentUser(pub User);

impl FromRequestParts<AuthState> for CurrentUser {
    type Rejection = AuthFailure;

    async fn from_request_parts(parts: &mut Parts, state: &AuthState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(Self(user.clone()));
        }

        let auth = state.as_ref().ok_or(AuthError::Disabled)?;
        Ok(Self(authenticate(auth, &parts.headers)?))
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Handle `POST /token`
async fn token_handler(State(auth): State<AuthState>, Form(form): Form<LoginForm>) -> Response {
    let Some(auth) = auth else {
        return AuthFailure(AuthError::Disabled).into_response();
    };

    match auth.login(form.username.clone(), form.password).await {
        Ok(token) => Json(token).into_response(),
        Err(e) => {
            tracing::info!(username = %form.username, error = %e, "login rejected");
            AuthFailure(e).into_response()
        }
    }
}

/// Handle `POST /register`
async fn register_handler(State(auth): State<AuthState>, Json(new_user): Json<NewUser>) -> Response {
    let Some(auth) = auth else {
        return AuthFailure(AuthError::Disabled).into_response();
    };

    match auth.register(new_user).await {
        Ok(_) => Json(serde_json::json!({"message": "User created successfully"})).into_response(),
        Err(e) => AuthFailure(e).into_response(),
    }
}

/// Handle `GET /users/me`
async fn me_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Handle `GET /protected`
async fn protected_handler(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("Hello {}, this is a protected route!", user.username)
    }))
}
