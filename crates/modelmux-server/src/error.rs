use axum::response::{IntoResponse, Response};
use http::{HeaderValue, header};
use modelmux_auth::AuthError;
pub(crate) use modelmux_llm::handler::error_response;

/// Auth failure as an axum rejection, adding the bearer challenge header
#[derive(Debug)]
pub struct AuthFailure(pub AuthError);

impl From<AuthError> for AuthFailure {
    fn from(error: AuthError) -> Self {
        Self(error)
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let mut response = error_response(&self.0);
        if self.0.challenges() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
