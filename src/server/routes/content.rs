//! Public browsing payload: every document grouped by category plus every
//! active algorithm card, served through a short-TTL cache so repeated page
//! loads within the window skip the database.

use crate::db::models::{DbAlgorithmRecord, DbFileRecord, FileCategory};
use crate::error::PortalError;
use crate::server::router::PortalState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: FileCategory,
    /// Newest first within the group.
    pub files: Vec<DbFileRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPayload {
    pub documents: Vec<CategoryGroup>,
    pub algorithms: Vec<DbAlgorithmRecord>,
}

pub fn group_by_category(files: Vec<DbFileRecord>) -> Vec<CategoryGroup> {
    FileCategory::ALL
        .into_iter()
        .map(|category| CategoryGroup {
            category,
            files: files
                .iter()
                .filter(|f| f.category == category)
                .cloned()
                .collect(),
        })
        .collect()
}

pub async fn content(
    State(state): State<PortalState>,
) -> Result<Json<Arc<ContentPayload>>, PortalError> {
    if let Some(hit) = state.content_cache.get(&0) {
        return Ok(Json(hit));
    }

    let files = state.db.list_all_files().await?;
    let algorithms = state.db.list_algorithms(true).await?;

    let payload = Arc::new(ContentPayload {
        documents: group_by_category(files),
        algorithms,
    });
    state.content_cache.insert(0, payload.clone());

    Ok(Json(payload))
}
