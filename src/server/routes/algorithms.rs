//! Flowchart algorithm CRUD and image upload.
//!
//! Image uploads are keyed `{algorithm_id}.{ext}` in the algorithms bucket,
//! so re-uploading for the same card overwrites the previous image.

use crate::db::models::IconTag;
use crate::db::patch::{AlgorithmCreate, AlgorithmPatch};
use crate::error::PortalError;
use crate::ingest::{self, ImageKind, MAX_IMAGE_BYTES};
use crate::server::guards::auth::RequireAdminCookie;
use crate::server::router::PortalState;
use crate::storage::Bucket;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

pub async fn list(State(state): State<PortalState>) -> Result<Json<Value>, PortalError> {
    let algorithms = state.db.list_algorithms(false).await?;
    Ok(Json(json!({ "algorithms": algorithms })))
}

/// Create request with every field optional, so missing required fields
/// produce a 400 with a reason instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateAlgorithmRequest {
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub icon_type: Option<IconTag>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

pub async fn create(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Json(req): Json<CreateAlgorithmRequest>,
) -> Result<(StatusCode, Json<Value>), PortalError> {
    let (Some(title), Some(short_title)) = (req.title, req.short_title) else {
        return Err(PortalError::validation(
            "Title and short title are required",
        ));
    };
    if title.trim().is_empty() || short_title.trim().is_empty() {
        return Err(PortalError::validation(
            "Title and short title are required",
        ));
    }

    let algorithm = state
        .db
        .create_algorithm(AlgorithmCreate {
            title,
            short_title,
            icon_type: req.icon_type.unwrap_or_default(),
            image_url: req.image_url,
            sort_order: req.sort_order,
            is_active: req.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "algorithm": algorithm }))))
}

pub async fn get_one(
    State(state): State<PortalState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError> {
    let algorithm = state
        .db
        .get_algorithm(&id)
        .await?
        .ok_or(PortalError::NotFound("Algorithm"))?;
    Ok(Json(json!({ "algorithm": algorithm })))
}

pub async fn update(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Path(id): Path<String>,
    Json(patch): Json<AlgorithmPatch>,
) -> Result<Json<Value>, PortalError> {
    if patch.is_empty() {
        return Err(PortalError::validation("No fields to update"));
    }

    let algorithm = state
        .db
        .patch_algorithm(&id, patch)
        .await?
        .ok_or(PortalError::NotFound("Algorithm"))?;
    Ok(Json(json!({ "algorithm": algorithm })))
}

pub async fn remove(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError> {
    let algorithm = state
        .db
        .delete_algorithm(&id)
        .await?
        .ok_or(PortalError::NotFound("Algorithm"))?;

    if let Some(url) = &algorithm.image_url {
        if let Some(key) = state.store.key_from_public_url(Bucket::Algorithms, url) {
            if let Err(e) = state.store.remove(Bucket::Algorithms, &key).await {
                warn!(id = %algorithm.id, key, error = %e, "failed to remove algorithm image");
            }
        }
    }

    Ok(Json(json!({ "success": true })))
}

struct ImageForm {
    data: Bytes,
    content_type: Option<String>,
    algorithm_id: Option<String>,
}

async fn read_image_form(mut multipart: Multipart) -> Result<ImageForm, PortalError> {
    let mut form = ImageForm {
        data: Bytes::new(),
        content_type: None,
        algorithm_id: None,
    };
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "file" => {
                saw_file = true;
                form.content_type = field.content_type().map(ToString::to_string);
                form.data = field.bytes().await?;
            }
            "algorithm_id" => form.algorithm_id = Some(field.text().await?),
            _ => {}
        }
    }

    if !saw_file {
        return Err(PortalError::validation("No file provided"));
    }
    Ok(form)
}

pub async fn upload_image(
    _admin: RequireAdminCookie,
    State(state): State<PortalState>,
    multipart: Multipart,
) -> Result<Json<Value>, PortalError> {
    let form = read_image_form(multipart).await?;

    let algorithm_id = form
        .algorithm_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PortalError::validation("Algorithm ID is required"))?;

    let kind = form
        .content_type
        .as_deref()
        .and_then(ImageKind::from_mime)
        .ok_or_else(|| {
            PortalError::validation("Invalid file type. Allowed: JPEG, PNG, GIF, WebP")
        })?;

    if form.data.len() > MAX_IMAGE_BYTES {
        return Err(PortalError::validation(
            "File too large. Maximum size is 10MB",
        ));
    }

    // The record must exist before we attach an image to it.
    state
        .db
        .get_algorithm(&algorithm_id)
        .await?
        .ok_or(PortalError::NotFound("Algorithm"))?;

    let key = ingest::image_object_key(&algorithm_id, kind);
    state.store.put(Bucket::Algorithms, &key, &form.data).await?;
    let image_url = state.store.public_url(Bucket::Algorithms, &key);

    let patch = AlgorithmPatch {
        image_url: Some(image_url.clone()),
        ..AlgorithmPatch::default()
    };
    match state.db.patch_algorithm(&algorithm_id, patch).await {
        Ok(Some(_)) => Ok(Json(json!({ "success": true, "image_url": image_url }))),
        Ok(None) => {
            // Record vanished between the existence check and the patch.
            if let Err(re) = state.store.remove(Bucket::Algorithms, &key).await {
                warn!(key, error = %re, "failed to roll back algorithm image");
            }
            Err(PortalError::NotFound("Algorithm"))
        }
        Err(e) => {
            if let Err(re) = state.store.remove(Bucket::Algorithms, &key).await {
                warn!(key, error = %re, "failed to roll back algorithm image");
            }
            Err(e)
        }
    }
}
