//! Database module: models, schema and the pool-owning actor.
//!
//! Layout:
//! - `models.rs`: Rust structs and closed enums mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `patch.rs`: create/partial-update payloads and list query types
//! - `actor.rs`: the `ractor` actor owning the pool, plus `DbHandle`

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

pub use models::{DbAlgorithmRecord, DbFileRecord, DocumentKind, FileCategory, IconTag};
pub use patch::{
    AlgorithmCreate, AlgorithmPatch, FileCreate, FileListQuery, FilePage, FilePatch, SortField,
    SortOrder,
};
pub use schema::SQLITE_INIT;

pub use actor::{DbHandle, spawn};
