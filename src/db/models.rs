use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Display grouping for a document record. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FileCategory {
    Cpgs,
    ResidentGuidelines,
    TraumaPolicies,
    MedicalStudent,
    Resources,
}

impl FileCategory {
    /// Category enum order, which is also the display group order on the
    /// public page.
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Cpgs,
        FileCategory::ResidentGuidelines,
        FileCategory::TraumaPolicies,
        FileCategory::MedicalStudent,
        FileCategory::Resources,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Cpgs => "cpgs",
            FileCategory::ResidentGuidelines => "resident_guidelines",
            FileCategory::TraumaPolicies => "trauma_policies",
            FileCategory::MedicalStudent => "medical_student",
            FileCategory::Resources => "resources",
        }
    }
}

impl FromStr for FileCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpgs" => Ok(FileCategory::Cpgs),
            "resident_guidelines" => Ok(FileCategory::ResidentGuidelines),
            "trauma_policies" => Ok(FileCategory::TraumaPolicies),
            "medical_student" => Ok(FileCategory::MedicalStudent),
            "resources" => Ok(FileCategory::Resources),
            _ => Err(()),
        }
    }
}

/// Document kind, detected once from the MIME type at ingestion and carried
/// on the record. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
}

impl DocumentKind {
    /// MIME allow-list for document uploads.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "application/msword" => Some(DocumentKind::Doc),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Doc => "doc",
        }
    }
}

/// Icon/color theme tag on an algorithm card. Purely presentational; the
/// server only validates membership in the closed set. Stored as TEXT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum IconTag {
    Ribs,
    Pelvis,
    Vascular,
    Spleen,
    Liver,
    Kidney,
    Airway,
    Brain,
    Endocrine,
    Heme,
    Ortho,
    #[default]
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbFileRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Public URL of the stored object in the `guidelines` bucket.
    pub file_url: String,
    pub category: FileCategory,
    pub file_type: DocumentKind,
    pub file_size: i64,
    pub original_filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbAlgorithmRecord {
    pub id: String,
    pub title: String,
    pub short_title: String,
    pub icon_type: IconTag,
    pub image_url: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
