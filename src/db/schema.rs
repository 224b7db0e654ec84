//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `files` table (uploaded clinical documents, one stored object per row)
/// - `algorithms` table (flowchart cards, optional stored image per row)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Clinical documents (PDF / DOC / DOCX), one object in the guidelines bucket
-- per row. file_url always points at that object.
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NULL,
    file_url TEXT NOT NULL,
    category TEXT NOT NULL,
    file_type TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    original_filename TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_files_category ON files(category);
CREATE INDEX IF NOT EXISTS idx_files_created_at ON files(created_at);

-- ---------------------------------------------------------------------------
-- Flowchart algorithm cards. sort_order is intentionally non-unique. display
-- ordering is ascending with ties stable by fetch order.
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS algorithms (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    short_title TEXT NOT NULL,
    icon_type TEXT NOT NULL DEFAULT 'default',
    image_url TEXT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_algorithms_sort_order ON algorithms(sort_order);
"#;
