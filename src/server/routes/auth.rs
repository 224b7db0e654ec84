//! The session gate: a single shared-secret password sets the admin cookie.
//!
//! There is no user table and no session store; the cookie carries a fixed
//! sentinel value checked by exact match in the guards.

use crate::server::guards::auth::{ADMIN_COOKIE, ADMIN_COOKIE_SENTINEL};
use crate::server::router::PortalState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

/// Lifetime of the admin session cookie.
const COOKIE_MAX_AGE: time::Duration = time::Duration::hours(24);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<PortalState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    let matches: bool = req
        .password
        .as_bytes()
        .ct_eq(state.admin_password.as_bytes())
        .into();

    if matches {
        let cookie = Cookie::build((ADMIN_COOKIE, ADMIN_COOKIE_SENTINEL))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(!state.insecure_cookie)
            .max_age(COOKIE_MAX_AGE)
            .build();
        (jar.add(cookie), Json(json!({ "success": true }))).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "success": false }))).into_response()
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let removal = Cookie::build((ADMIN_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(json!({ "success": true }))).into_response()
}
