use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// Name of the shared-secret session flag.
pub const ADMIN_COOKIE: &str = "admin-auth";

/// Exact value the gate checks for. This is an allow/deny flag, not a
/// secret; the secret comparison happens once at login.
pub const ADMIN_COOKIE_SENTINEL: &str = "true";

fn cookie_is_set(parts: &Parts) -> bool {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(ADMIN_COOKIE)
        .is_some_and(|c| c.value() == ADMIN_COOKIE_SENTINEL)
}

/// Admin gate for API routes: missing or wrong cookie yields 401 JSON.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminCookie;

impl<S> FromRequestParts<S> for RequireAdminCookie
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if cookie_is_set(parts) {
            Ok(RequireAdminCookie)
        } else {
            Err(AuthError::NotAdmin)
        }
    }
}

/// Admin gate for page routes: missing or wrong cookie redirects to the
/// login path instead of returning a JSON error.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminPage;

impl<S> FromRequestParts<S> for RequireAdminPage
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if cookie_is_set(parts) {
            Ok(RequireAdminPage)
        } else {
            Err(Redirect::to("/login"))
        }
    }
}

pub enum AuthError {
    NotAdmin,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::NotAdmin => "Missing or invalid admin cookie",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}
