use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::SystemTime;
use tower::ServiceExt;
use trauma_portal::db::DbHandle;

const BOUNDARY: &str = "portal-test-boundary";
const ADMIN_COOKIE: &str = "admin-auth=true";

struct TestEnv {
    app: Router,
    db: DbHandle,
    db_path: PathBuf,
    store_root: PathBuf,
}

async fn setup(tag: &str) -> TestEnv {
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let nonce = hasher.finish();

    let db_path = std::env::temp_dir().join(format!("test_{tag}_{nonce}.sqlite"));
    let store_root = std::env::temp_dir().join(format!("test_{tag}_{nonce}_store"));

    let mut cfg = trauma_portal::config::Config::default();
    cfg.basic.admin_password = "pwd".to_string();
    cfg.storage.root = store_root.clone();

    let database_url = format!("sqlite:{}", db_path.to_str().unwrap());
    let db = trauma_portal::db::spawn(&database_url).await;

    let store = trauma_portal::storage::BucketStore::new(&cfg.storage);
    store.ensure_layout().await.unwrap();

    let state = trauma_portal::server::router::PortalState::new(db.clone(), store, &cfg);
    let app = trauma_portal::server::router::portal_router(state);

    TestEnv {
        app,
        db,
        db_path,
        store_root,
    }
}

impl TestEnv {
    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.store_root).await;
        for suffix in ["", "-wal", "-shm"] {
            let p = PathBuf::from(format!("{}{suffix}", self.db_path.to_string_lossy()));
            let _ = tokio::fs::remove_file(&p).await;
        }
    }
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", ADMIN_COOKIE);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn image_upload_request(algorithm_id: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"chart.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"algorithm_id\"\r\n\r\n",
    );
    body.extend_from_slice(algorithm_id.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/algorithms/upload-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("cookie", ADMIN_COOKIE)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn create_validates_and_lists_in_sort_order() {
    let env = setup("algo_create").await;

    // Missing required fields is a validation error, not a deserialization one
    let (status, json) = send_json(
        &env.app,
        "POST",
        "/api/algorithms",
        Some(serde_json::json!({ "title": "Only a title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Title and short title are required")
    );

    let (status, json) = send_json(
        &env.app,
        "POST",
        "/api/algorithms",
        Some(serde_json::json!({
            "title": "Pelvic fracture management",
            "short_title": "Pelvis",
            "icon_type": "pelvis"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["algorithm"]["title"], "Pelvic fracture management");
    assert_eq!(json["algorithm"]["icon_type"], "pelvis");
    assert_eq!(json["algorithm"]["sort_order"], 1);
    assert_eq!(json["algorithm"]["is_active"], true);
    let first_id = json["algorithm"]["id"].as_str().unwrap().to_string();

    let (status, json) = send_json(
        &env.app,
        "POST",
        "/api/algorithms",
        Some(serde_json::json!({
            "title": "Blunt splenic injury",
            "short_title": "Spleen",
            "icon_type": "spleen"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["algorithm"]["sort_order"], 2);

    let (status, json) = send_json(&env.app, "GET", "/api/algorithms", None).await;
    assert_eq!(status, StatusCode::OK);
    let algorithms = json["algorithms"].as_array().unwrap();
    assert_eq!(algorithms.len(), 2);
    assert_eq!(algorithms[0]["id"], first_id.as_str());

    env.cleanup().await;
}

#[tokio::test]
async fn update_and_delete_round_out_the_admin_surface() {
    let env = setup("algo_crud").await;

    let (_, json) = send_json(
        &env.app,
        "POST",
        "/api/algorithms",
        Some(serde_json::json!({ "title": "REBOA", "short_title": "REBOA" })),
    )
    .await;
    let id = json["algorithm"]["id"].as_str().unwrap().to_string();

    let (status, json) = send_json(
        &env.app,
        "PUT",
        &format!("/api/algorithms/{id}"),
        Some(serde_json::json!({ "icon_type": "vascular", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["algorithm"]["icon_type"], "vascular");
    assert_eq!(json["algorithm"]["is_active"], false);
    assert_eq!(json["algorithm"]["title"], "REBOA");

    let (status, _) = send_json(
        &env.app,
        "PUT",
        &format!("/api/algorithms/{id}"),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &env.app,
        "PUT",
        "/api/algorithms/no-such-id",
        Some(serde_json::json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) =
        send_json(&env.app, "DELETE", &format!("/api/algorithms/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = send_json(&env.app, "DELETE", &format!("/api/algorithms/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    env.cleanup().await;
}

#[tokio::test]
async fn image_upload_stores_object_and_links_url() {
    let env = setup("algo_image").await;

    let (_, json) = send_json(
        &env.app,
        "POST",
        "/api/algorithms",
        Some(serde_json::json!({ "title": "Chest tube", "short_title": "Chest" })),
    )
    .await;
    let id = json["algorithm"]["id"].as_str().unwrap().to_string();

    // Unknown algorithm gets a 404 before any object is written
    let resp = env
        .app
        .clone()
        .oneshot(image_upload_request("missing", "image/png", b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!env.store_root.join("algorithms/missing.png").exists());

    // Disallowed image type
    let resp = env
        .app
        .clone()
        .oneshot(image_upload_request(&id, "image/tiff", b"II*\x00"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Successful upload writes one object and records its public URL
    let resp = env
        .app
        .clone()
        .oneshot(image_upload_request(&id, "image/png", b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["success"], true);
    let image_url = json["image_url"].as_str().unwrap();
    assert!(image_url.ends_with(&format!("/storage/algorithms/{id}.png")));

    let object_path = env.store_root.join(format!("algorithms/{id}.png"));
    assert_eq!(tokio::fs::read(&object_path).await.unwrap(), b"\x89PNG");

    let record = env.db.get_algorithm(&id).await.unwrap().unwrap();
    assert_eq!(record.image_url.as_deref(), Some(image_url));

    // Deleting the algorithm also removes the stored image
    let (status, _) = send_json(&env.app, "DELETE", &format!("/api/algorithms/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!object_path.exists(), "image object removed with the row");

    env.cleanup().await;
}
