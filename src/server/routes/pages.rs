//! Page-route shells. The admin and login UIs are rendered client-side; the
//! server's job here is only the gate check and redirect behavior.

use crate::server::guards::auth::RequireAdminPage;
use axum::response::Html;

pub async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Trauma Portal - Login</title>")
}

/// Any path under `/admin`: reachable only with the admin cookie, otherwise
/// the guard redirects to `/login`.
pub async fn admin_page(_admin: RequireAdminPage) -> Html<&'static str> {
    Html("<!doctype html><title>Trauma Portal - Admin</title>")
}
