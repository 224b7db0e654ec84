//! Filesystem-backed object store.
//!
//! The portal keeps uploaded binaries outside the database, in two buckets
//! under a configured root: `guidelines` for clinical documents and
//! `algorithms` for flowchart images. Every stored object has a public URL
//! of the form `{public_base_url}/storage/{bucket}/{key}`, which the HTTP
//! layer serves with `tower_http::services::ServeDir`.

use crate::config::StorageConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// The two object buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Guidelines,
    Algorithms,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Guidelines => "guidelines",
            Bucket::Algorithms => "algorithms",
        }
    }
}

#[derive(Clone)]
pub struct BucketStore {
    root: PathBuf,
    public_base_url: Arc<str>,
}

impl BucketStore {
    pub fn new(cfg: &StorageConfig) -> Self {
        Self {
            root: cfg.root.clone(),
            public_base_url: Arc::from(cfg.public_base_url.trim_end_matches('/')),
        }
    }

    /// Directory served under `/storage` by the HTTP layer.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the bucket directories if missing.
    pub async fn ensure_layout(&self) -> io::Result<()> {
        for bucket in [Bucket::Guidelines, Bucket::Algorithms] {
            fs::create_dir_all(self.root.join(bucket.as_str())).await?;
        }
        Ok(())
    }

    /// Write an object. Parent directories are created; the write goes to a
    /// temp file first and is renamed into place so readers never observe a
    /// partial object. Overwrites an existing key.
    pub async fn put(&self, bucket: Bucket, key: &str, data: &[u8]) -> io::Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Unique temp name per write; `with_extension` would collapse
        // `{id}.jpg` and `{id}.png` onto one temp path under concurrency.
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("object");
        let tmp = path.with_file_name(format!("{file_name}.{}.tmp", Uuid::new_v4()));
        let mut f = fs::File::create(&tmp).await?;
        f.write_all(data).await?;
        f.sync_all().await?;
        drop(f);
        fs::rename(&tmp, &path).await?;

        debug!(bucket = bucket.as_str(), key, bytes = data.len(), "object stored");
        Ok(())
    }

    /// Remove an object. Missing keys are not an error.
    pub async fn remove(&self, bucket: Bucket, key: &str) -> io::Result<()> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(bucket = bucket.as_str(), key, "object removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Public URL for an object key.
    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, bucket.as_str(), key)
    }

    /// Derive the object key back from a stored public URL. Returns `None`
    /// for URLs that do not point into the given bucket (foreign URLs are
    /// left alone on delete).
    pub fn key_from_public_url(&self, bucket: Bucket, url: &str) -> Option<String> {
        let marker = format!("/storage/{}/", bucket.as_str());
        let (_, key) = url.split_once(marker.as_str())?;
        if key.is_empty() {
            return None;
        }
        Some(key.to_string())
    }

    fn object_path(&self, bucket: Bucket, key: &str) -> io::Result<PathBuf> {
        if !valid_key(key) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid object key: {key}"),
            ));
        }
        Ok(self.root.join(bucket.as_str()).join(key))
    }
}

/// Object keys are generated server-side (uuid/category/algorithm-id based),
/// so anything outside a conservative shape is rejected outright.
fn valid_key(key: &str) -> bool {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return false;
    }
    key.split('/').all(|seg| {
        !seg.is_empty()
            && seg != "."
            && seg != ".."
            && seg
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    })
}
