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
use trauma_portal::db::{
    AlgorithmCreate, DbHandle, DocumentKind, FileCategory, FileCreate, IconTag,
};

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

    async fn seed_file(&self, tag: &str, category: FileCategory) {
        self.db
            .create_file(FileCreate {
                id: format!("id-{tag}"),
                title: format!("title {tag}"),
                description: None,
                file_url: format!(
                    "http://localhost:8190/storage/guidelines/{}/{tag}.pdf",
                    category.as_str()
                ),
                category,
                file_type: DocumentKind::Pdf,
                file_size: 10,
                original_filename: format!("{tag}.pdf"),
            })
            .await
            .unwrap();
    }

    async fn seed_algorithm(&self, title: &str, active: bool) -> String {
        self.db
            .create_algorithm(AlgorithmCreate {
                title: title.to_string(),
                short_title: title.to_string(),
                icon_type: IconTag::Default,
                image_url: None,
                sort_order: None,
                is_active: Some(active),
            })
            .await
            .unwrap()
            .id
    }
}

async fn fetch_content(app: &Router) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/content")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn content_groups_every_category_and_hides_inactive_algorithms() {
    let env = setup("content_shape").await;

    env.seed_file("mtp", FileCategory::TraumaPolicies).await;
    env.seed_file("cpg1", FileCategory::Cpgs).await;
    env.seed_file("cpg2", FileCategory::Cpgs).await;
    env.seed_algorithm("Pelvis", true).await;
    env.seed_algorithm("Hidden", false).await;

    let json = fetch_content(&env.app).await;

    // One group per category in display order, empty groups included
    let documents = json["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 5);
    let categories: Vec<&str> = documents
        .iter()
        .map(|g| g["category"].as_str().unwrap())
        .collect();
    assert_eq!(
        categories,
        [
            "cpgs",
            "resident_guidelines",
            "trauma_policies",
            "medical_student",
            "resources"
        ]
    );
    assert_eq!(documents[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(documents[1]["files"].as_array().unwrap().len(), 0);
    assert_eq!(documents[2]["files"].as_array().unwrap().len(), 1);

    // Only active algorithm cards are published
    let algorithms = json["algorithms"].as_array().unwrap();
    assert_eq!(algorithms.len(), 1);
    assert_eq!(algorithms[0]["title"], "Pelvis");

    env.cleanup().await;
}

#[tokio::test]
async fn content_is_served_from_cache_within_the_window() {
    let env = setup("content_cache").await;

    env.seed_file("first", FileCategory::Cpgs).await;
    let before = fetch_content(&env.app).await;
    assert_eq!(before["documents"][0]["files"].as_array().unwrap().len(), 1);

    // A write behind the cache does not show up until the entry expires
    env.seed_file("second", FileCategory::Cpgs).await;
    let after = fetch_content(&env.app).await;
    assert_eq!(
        after["documents"][0]["files"].as_array().unwrap().len(),
        1,
        "cached payload is stale inside the ttl window"
    );

    env.cleanup().await;
}
