use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory holding the `guidelines` and `algorithms` buckets.
    /// TOML: `storage.root`. Default: `./storage`.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Base URL prepended to stored object paths when building public URLs,
    /// e.g. `https://portal.example.org`. The service itself serves the
    /// objects under `{public_base_url}/storage/{bucket}/{key}`.
    /// TOML: `storage.public_base_url`. Default: `http://localhost:8190`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_public_base_url() -> String {
    "http://localhost:8190".to_string()
}
