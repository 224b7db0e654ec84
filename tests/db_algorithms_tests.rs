use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;
use tokio::fs;
use trauma_portal::db::{AlgorithmCreate, AlgorithmPatch, IconTag};

fn temp_database_url(tag: &str) -> (std::path::PathBuf, String) {
    let tmp_dir = std::env::temp_dir();
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let db_path = tmp_dir.join(format!("test_{tag}_{}.sqlite", hasher.finish()));
    let url = format!("sqlite:{}", db_path.to_str().unwrap());
    (db_path, url)
}

fn algorithm_create(title: &str, sort_order: Option<i64>) -> AlgorithmCreate {
    AlgorithmCreate {
        title: title.to_string(),
        short_title: title.chars().take(4).collect(),
        icon_type: IconTag::Pelvis,
        image_url: None,
        sort_order,
        is_active: None,
    }
}

#[tokio::test]
async fn test_algorithms_db_actor_baseline() {
    let (db_path, database_url) = temp_database_url("algos_db");
    let db = trauma_portal::db::spawn(&database_url).await;

    assert!(db.list_algorithms(false).await.unwrap().is_empty());

    // Creation defaults: sort_order max+1, active true
    let first = db
        .create_algorithm(algorithm_create("Pelvic binder", None))
        .await
        .unwrap();
    assert_eq!(first.sort_order, 1);
    assert!(first.is_active);
    assert_eq!(first.icon_type, IconTag::Pelvis);

    let second = db
        .create_algorithm(algorithm_create("REBOA", None))
        .await
        .unwrap();
    assert_eq!(second.sort_order, 2);

    // Explicit sort_order wins; duplicates are allowed
    let third = db
        .create_algorithm(algorithm_create("Chest tube", Some(1)))
        .await
        .unwrap();
    assert_eq!(third.sort_order, 1);

    // Listing is ascending by sort_order, ties stable by insertion
    let all = db.list_algorithms(false).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Pelvic binder", "Chest tube", "REBOA"]);

    // Deactivation drops a card from the active listing only
    let patched = db
        .patch_algorithm(
            &second.id,
            AlgorithmPatch {
                is_active: Some(false),
                ..AlgorithmPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(!patched.is_active);

    let active = db.list_algorithms(true).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|a| a.id != second.id));
    assert_eq!(db.list_algorithms(false).await.unwrap().len(), 3);

    // Image URL set then cleared via an empty value
    let with_image = db
        .patch_algorithm(
            &first.id,
            AlgorithmPatch {
                image_url: Some("http://localhost:8190/storage/algorithms/a.png".to_string()),
                ..AlgorithmPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(with_image.image_url.is_some());

    let cleared = db
        .patch_algorithm(
            &first.id,
            AlgorithmPatch {
                image_url: Some(String::new()),
                ..AlgorithmPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.image_url, None);

    // Delete returns the row once
    assert!(db.delete_algorithm(&third.id).await.unwrap().is_some());
    assert!(db.delete_algorithm(&third.id).await.unwrap().is_none());
    assert_eq!(db.list_algorithms(false).await.unwrap().len(), 2);

    let wal = std::path::PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm = std::path::PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal).await;
    let _ = fs::remove_file(&shm).await;
    let _ = fs::remove_file(&db_path).await;
}
