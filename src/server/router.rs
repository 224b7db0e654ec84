use crate::config::Config;
use crate::db::DbHandle;
use crate::ingest::MAX_DOCUMENT_BYTES;
use crate::server::routes::{algorithms, auth, content, files, pages};
use crate::storage::BucketStore;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{HeaderName, HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use base64::Engine as _;
use moka::sync::Cache;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// TTL of the public content payload cache; admin mutations become
/// visible within this window.
const CONTENT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Multipart bodies may exceed the stored-object ceiling by field overhead;
/// the precise per-file limit is enforced in the upload handlers.
const MAX_BODY_BYTES: usize = MAX_DOCUMENT_BYTES + 1024 * 1024;

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct PortalState {
    pub db: DbHandle,
    pub store: BucketStore,
    pub admin_password: Arc<str>,
    pub insecure_cookie: bool,
    pub content_cache: Cache<u8, Arc<content::ContentPayload>>,
}

impl PortalState {
    pub fn new(db: DbHandle, store: BucketStore, cfg: &Config) -> Self {
        let content_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CONTENT_CACHE_TTL)
            .build();

        Self {
            db,
            store,
            admin_password: Arc::from(cfg.basic.admin_password.as_str()),
            insecure_cookie: cfg.basic.insecure_cookie,
            content_cache,
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id` for easier correlation, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn portal_router(state: PortalState) -> Router {
    let api = Router::new()
        // Session gate
        .route("/api/auth", post(auth::login).delete(auth::logout))
        // Documents
        .route("/api/upload", post(files::upload))
        .route("/api/admin/files", get(files::list))
        .route(
            "/api/files/{id}",
            get(files::get_one).put(files::update).delete(files::remove),
        )
        // Algorithms
        .route(
            "/api/algorithms",
            get(algorithms::list).post(algorithms::create),
        )
        .route(
            "/api/algorithms/{id}",
            get(algorithms::get_one)
                .put(algorithms::update)
                .delete(algorithms::remove),
        )
        .route(
            "/api/algorithms/upload-image",
            post(algorithms::upload_image),
        )
        // Public browsing payload
        .route("/api/content", get(content::content));

    let pages = Router::new()
        .route("/login", get(pages::login_page))
        .route("/admin", get(pages::admin_page))
        .route("/admin/{*rest}", get(pages::admin_page));

    Router::new()
        .merge(api)
        .merge(pages)
        .nest_service("/storage", ServeDir::new(state.store.root()))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
