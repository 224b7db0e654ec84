//! Document upload and management routes.
//!
//! Upload is a two-step sequence without a transaction: the object write
//! lands first, then the metadata row. A failed insert compensates by
//! deleting the just-written object. Delete runs the other way around (row
//! first, object best-effort) and accepts the narrow inconsistency window.

use crate::db::models::{DbFileRecord, DocumentKind, FileCategory};
use crate::db::patch::{FileCreate, FileListQuery, FilePatch, SortField, SortOrder};
use crate::error::PortalError;
use crate::ingest::{self, MAX_DOCUMENT_BYTES};
use crate::server::guards::auth::RequireAdminCookie;
use crate::server::router::PortalState;
use crate::storage::Bucket;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

struct UploadForm {
    data: Bytes,
    content_type: Option<String>,
    original_filename: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, PortalError> {
    let mut form = UploadForm {
        data: Bytes::new(),
        content_type: None,
        original_filename: None,
        title: None,
        description: None,
        category: None,
    };
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "file" => {
                saw_file = true;
                form.content_type = field.content_type().map(ToString::to_string);
                form.original_filename = field.file_name().map(ToString::to_string);
                form.data = field.bytes().await?;
            }
            "title" => form.title = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            _ => {}
        }
    }

    if !saw_file {
        return Err(PortalError::validation("Missing required fields"));
    }
    Ok(form)
}

pub async fn upload(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    multipart: Multipart,
) -> Result<Json<Value>, PortalError> {
    let form = read_upload_form(multipart).await?;

    let (Some(title), Some(category_raw)) = (form.title, form.category) else {
        return Err(PortalError::validation("Missing required fields"));
    };
    if title.trim().is_empty() {
        return Err(PortalError::validation("Missing required fields"));
    }

    let kind = form
        .content_type
        .as_deref()
        .and_then(DocumentKind::from_mime)
        .ok_or_else(|| {
            PortalError::validation("Only PDF and Word documents (.pdf, .docx, .doc) are allowed")
        })?;

    if form.data.len() > MAX_DOCUMENT_BYTES {
        return Err(PortalError::validation("File size must be less than 10MB"));
    }

    let category: FileCategory = category_raw
        .parse()
        .map_err(|()| PortalError::validation(format!("Unknown category: {category_raw}")))?;

    let key = ingest::document_object_key(category, kind);
    state.store.put(Bucket::Guidelines, &key, &form.data).await?;
    let file_url = state.store.public_url(Bucket::Guidelines, &key);

    let create = FileCreate {
        id: Uuid::new_v4().to_string(),
        title,
        description: form.description.filter(|d| !d.is_empty()),
        file_url,
        category,
        file_type: kind,
        file_size: form.data.len() as i64,
        original_filename: form
            .original_filename
            .unwrap_or_else(|| format!("upload.{}", kind.extension())),
    };

    match state.db.create_file(create).await {
        Ok(file) => Ok(Json(json!({ "success": true, "file": file }))),
        Err(e) => {
            // Compensate: the object must not outlive a failed insert.
            if let Err(re) = state.store.remove(Bucket::Guidelines, &key).await {
                warn!(key, error = %re, "failed to roll back stored object");
            }
            Err(e)
        }
    }
}

/// Raw query parameters for the admin listing. Everything is optional and
/// lenient; malformed values fall back to defaults rather than erroring.
#[derive(Debug, Default, Deserialize)]
pub struct RawListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl RawListParams {
    fn normalize(self) -> FileListQuery {
        let page = self
            .page
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = self
            .limit
            .and_then(|l| l.parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(20);
        let category = self.category.and_then(|c| c.parse::<FileCategory>().ok());

        FileListQuery {
            page,
            limit,
            category,
            sort_by: SortField::parse_or_default(self.sort_by.as_deref()),
            sort_order: SortOrder::parse_or_default(self.sort_order.as_deref()),
        }
    }
}

pub async fn list(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Query(params): Query<RawListParams>,
) -> Result<Json<Value>, PortalError> {
    let query = params.normalize();
    let page = state.db.list_files(query.clone()).await?;

    Ok(Json(json!({
        "files": page.files,
        "pagination": {
            "page": query.page,
            "limit": query.limit,
            "total": page.total,
            "totalPages": query.total_pages(page.total),
        }
    })))
}

pub async fn get_one(
    State(state): State<PortalState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError> {
    let file: DbFileRecord = state
        .db
        .get_file(&id)
        .await?
        .ok_or(PortalError::NotFound("File"))?;
    Ok(Json(json!({ "file": file })))
}

pub async fn update(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Path(id): Path<String>,
    Json(patch): Json<FilePatch>,
) -> Result<Json<Value>, PortalError> {
    if patch.is_empty() {
        return Err(PortalError::validation("No fields to update"));
    }

    let file = state
        .db
        .patch_file(&id, patch)
        .await?
        .ok_or(PortalError::NotFound("File"))?;
    Ok(Json(json!({ "file": file })))
}

pub async fn remove(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError> {
    let file = state
        .db
        .delete_file(&id)
        .await?
        .ok_or(PortalError::NotFound("File"))?;

    // Best-effort object removal; the row is already gone and a failure
    // here is logged, not rolled back.
    match state
        .store
        .key_from_public_url(Bucket::Guidelines, &file.file_url)
    {
        Some(key) => {
            if let Err(e) = state.store.remove(Bucket::Guidelines, &key).await {
                warn!(id = %file.id, key, error = %e, "failed to remove stored object");
            }
        }
        None => {
            warn!(id = %file.id, url = %file.file_url, "file_url does not map into the guidelines bucket");
        }
    }

    Ok(Json(json!({ "success": true })))
}
