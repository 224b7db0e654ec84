use serde::{Deserialize, Serialize};

use super::models::{DocumentKind, FileCategory, IconTag};

/// Metadata row for a freshly uploaded document. The object is already in
/// the `guidelines` bucket when this is inserted; `file_url` points at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCreate {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub category: FileCategory,
    pub file_type: DocumentKind,
    pub file_size: i64,
    pub original_filename: String,
}

/// Partial update for a document record; only present fields are applied.
/// `description: Some(String::new())` clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<FileCategory>,
}

impl FilePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmCreate {
    pub title: String,
    pub short_title: String,
    #[serde(default)]
    pub icon_type: IconTag,
    pub image_url: Option<String>,
    /// When absent, the actor assigns max(existing sort_order) + 1.
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

/// Partial update for an algorithm record; only present fields are applied.
/// `image_url: Some(String::new())` clears the stored URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmPatch {
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub icon_type: Option<IconTag>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl AlgorithmPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.short_title.is_none()
            && self.icon_type.is_none()
            && self.image_url.is_none()
            && self.sort_order.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    UpdatedAt,
}

impl SortField {
    /// Column name for ORDER BY. Closed set, safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Lenient parse matching the query-string spelling; malformed or
    /// missing values fall back to the default.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("title") => SortField::Title,
            Some("updated_at") => SortField::UpdatedAt,
            _ => SortField::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Normalized listing parameters for the admin files table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub category: Option<FileCategory>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for FileListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            category: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl FileListQuery {
    pub fn offset(&self) -> i64 {
        // Saturates so absurd page/limit pairs stay a valid (empty) slice.
        i64::from(self.page.saturating_sub(1)).saturating_mul(i64::from(self.limit))
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        (total + i64::from(self.limit) - 1) / i64::from(self.limit)
    }
}

/// One page of document rows plus the unfiltered-by-pagination total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePage {
    pub files: Vec<super::models::DbFileRecord>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceil_of_total_over_limit() {
        let q = FileListQuery {
            limit: 10,
            ..FileListQuery::default()
        };
        assert_eq!(q.total_pages(0), 0);
        assert_eq!(q.total_pages(1), 1);
        assert_eq!(q.total_pages(10), 1);
        assert_eq!(q.total_pages(11), 2);
        assert_eq!(q.total_pages(20), 2);
    }

    #[test]
    fn offset_is_zero_based_from_page_one() {
        let q = FileListQuery {
            page: 2,
            limit: 10,
            ..FileListQuery::default()
        };
        assert_eq!(q.offset(), 10);

        let first = FileListQuery::default();
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn offset_saturates_on_extreme_page_and_limit() {
        let q = FileListQuery {
            page: u32::MAX,
            limit: u32::MAX,
            ..FileListQuery::default()
        };
        assert_eq!(q.offset(), i64::MAX);
        assert_eq!(q.total_pages(30), 1);
    }

    #[test]
    fn sort_params_fall_back_to_defaults() {
        assert_eq!(SortField::parse_or_default(Some("title")), SortField::Title);
        assert_eq!(
            SortField::parse_or_default(Some("garbage")),
            SortField::CreatedAt
        );
        assert_eq!(SortField::parse_or_default(None), SortField::CreatedAt);
        assert_eq!(SortOrder::parse_or_default(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default(Some("sideways")), SortOrder::Desc);
    }
}
