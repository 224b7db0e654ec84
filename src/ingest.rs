//! Upload validation and object-key generation.
//!
//! Kind detection happens exactly once here, from the client-declared MIME
//! type; the resulting tag is carried on the record so nothing downstream
//! re-detects from strings.

use crate::db::models::{DocumentKind, FileCategory};
use uuid::Uuid;

/// Size ceiling for document uploads (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Size ceiling for algorithm image uploads (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image kinds accepted for algorithm flowcharts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// MIME allow-list for image uploads.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }
}

/// Object key for a document: `{category}/{uuid}.{ext}` in the guidelines
/// bucket.
pub fn document_object_key(category: FileCategory, kind: DocumentKind) -> String {
    format!(
        "{}/{}.{}",
        category.as_str(),
        Uuid::new_v4(),
        kind.extension()
    )
}

/// Object key for an algorithm image: `{algorithm_id}.{ext}` in the
/// algorithms bucket. Re-uploads for the same algorithm overwrite.
pub fn image_object_key(algorithm_id: &str, kind: ImageKind) -> String {
    format!("{algorithm_id}.{}", kind.extension())
}
