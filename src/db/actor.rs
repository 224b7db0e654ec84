use crate::db::models::{DbAlgorithmRecord, DbFileRecord};
use crate::db::patch::{
    AlgorithmCreate, AlgorithmPatch, FileCreate, FileListQuery, FilePage, FilePatch,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::PortalError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};
use uuid::Uuid;

const FILE_COLUMNS: &str = "id, title, description, file_url, category, file_type, file_size, original_filename, created_at, updated_at";
const ALGORITHM_COLUMNS: &str =
    "id, title, short_title, icon_type, image_url, sort_order, is_active, created_at, updated_at";

#[derive(Debug)]
pub enum DbMessage {
    /// Insert a document metadata row and return the stored record.
    CreateFile(FileCreate, RpcReplyPort<Result<DbFileRecord, PortalError>>),

    /// Fetch a document record by id.
    GetFile(String, RpcReplyPort<Result<Option<DbFileRecord>, PortalError>>),

    /// Paginated, filtered, sorted slice of document rows plus total count.
    ListFiles(FileListQuery, RpcReplyPort<Result<FilePage, PortalError>>),

    /// All document rows, newest first (public content payload).
    ListAllFiles(RpcReplyPort<Result<Vec<DbFileRecord>, PortalError>>),

    /// Apply present fields of a patch to a document row.
    PatchFile(
        String,
        FilePatch,
        RpcReplyPort<Result<Option<DbFileRecord>, PortalError>>,
    ),

    /// Delete a document row, returning the removed record (for storage cleanup).
    DeleteFile(String, RpcReplyPort<Result<Option<DbFileRecord>, PortalError>>),

    /// Insert an algorithm row and return the stored record.
    CreateAlgorithm(
        AlgorithmCreate,
        RpcReplyPort<Result<DbAlgorithmRecord, PortalError>>,
    ),

    /// Fetch an algorithm record by id.
    GetAlgorithm(
        String,
        RpcReplyPort<Result<Option<DbAlgorithmRecord>, PortalError>>,
    ),

    /// All algorithm rows ascending by sort_order; optionally active only.
    ListAlgorithms(
        bool,
        RpcReplyPort<Result<Vec<DbAlgorithmRecord>, PortalError>>,
    ),

    /// Apply present fields of a patch to an algorithm row.
    PatchAlgorithm(
        String,
        AlgorithmPatch,
        RpcReplyPort<Result<Option<DbAlgorithmRecord>, PortalError>>,
    ),

    /// Delete an algorithm row, returning the removed record.
    DeleteAlgorithm(
        String,
        RpcReplyPort<Result<Option<DbAlgorithmRecord>, PortalError>>,
    ),
}

#[derive(Clone)]
pub struct DbHandle {
    actor: ActorRef<DbMessage>,
}

impl DbHandle {
    pub async fn create_file(&self, create: FileCreate) -> Result<DbFileRecord, PortalError> {
        ractor::call!(self.actor, DbMessage::CreateFile, create)
            .map_err(|e| PortalError::Actor(format!("DbActor CreateFile RPC failed: {e}")))?
    }

    pub async fn get_file(&self, id: &str) -> Result<Option<DbFileRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::GetFile, id.to_string())
            .map_err(|e| PortalError::Actor(format!("DbActor GetFile RPC failed: {e}")))?
    }

    pub async fn list_files(&self, query: FileListQuery) -> Result<FilePage, PortalError> {
        ractor::call!(self.actor, DbMessage::ListFiles, query)
            .map_err(|e| PortalError::Actor(format!("DbActor ListFiles RPC failed: {e}")))?
    }

    pub async fn list_all_files(&self) -> Result<Vec<DbFileRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::ListAllFiles)
            .map_err(|e| PortalError::Actor(format!("DbActor ListAllFiles RPC failed: {e}")))?
    }

    pub async fn patch_file(
        &self,
        id: &str,
        patch: FilePatch,
    ) -> Result<Option<DbFileRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::PatchFile, id.to_string(), patch)
            .map_err(|e| PortalError::Actor(format!("DbActor PatchFile RPC failed: {e}")))?
    }

    pub async fn delete_file(&self, id: &str) -> Result<Option<DbFileRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::DeleteFile, id.to_string())
            .map_err(|e| PortalError::Actor(format!("DbActor DeleteFile RPC failed: {e}")))?
    }

    pub async fn create_algorithm(
        &self,
        create: AlgorithmCreate,
    ) -> Result<DbAlgorithmRecord, PortalError> {
        ractor::call!(self.actor, DbMessage::CreateAlgorithm, create)
            .map_err(|e| PortalError::Actor(format!("DbActor CreateAlgorithm RPC failed: {e}")))?
    }

    pub async fn get_algorithm(&self, id: &str) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::GetAlgorithm, id.to_string())
            .map_err(|e| PortalError::Actor(format!("DbActor GetAlgorithm RPC failed: {e}")))?
    }

    pub async fn list_algorithms(
        &self,
        active_only: bool,
    ) -> Result<Vec<DbAlgorithmRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::ListAlgorithms, active_only)
            .map_err(|e| PortalError::Actor(format!("DbActor ListAlgorithms RPC failed: {e}")))?
    }

    pub async fn patch_algorithm(
        &self,
        id: &str,
        patch: AlgorithmPatch,
    ) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::PatchAlgorithm, id.to_string(), patch)
            .map_err(|e| PortalError::Actor(format!("DbActor PatchAlgorithm RPC failed: {e}")))?
    }

    pub async fn delete_algorithm(
        &self,
        id: &str,
    ) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        ractor::call!(self.actor, DbMessage::DeleteAlgorithm, id.to_string())
            .map_err(|e| PortalError::Actor(format!("DbActor DeleteAlgorithm RPC failed: {e}")))?
    }

    /// Stop the actor. Subsequent calls fail with an actor RPC error.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbMessage::CreateFile(create, reply) => {
                let res = self.create_file(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbMessage::GetFile(id, reply) => {
                let res = self.get_file(&state.pool, &id).await;
                let _ = reply.send(res);
            }
            DbMessage::ListFiles(query, reply) => {
                let res = self.list_files(&state.pool, &query).await;
                let _ = reply.send(res);
            }
            DbMessage::ListAllFiles(reply) => {
                let res = self.list_all_files(&state.pool).await;
                let _ = reply.send(res);
            }
            DbMessage::PatchFile(id, patch, reply) => {
                let res = self.patch_file(&state.pool, &id, patch).await;
                let _ = reply.send(res);
            }
            DbMessage::DeleteFile(id, reply) => {
                let res = self.delete_file(&state.pool, &id).await;
                let _ = reply.send(res);
            }
            DbMessage::CreateAlgorithm(create, reply) => {
                let res = self.create_algorithm(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbMessage::GetAlgorithm(id, reply) => {
                let res = self.get_algorithm(&state.pool, &id).await;
                let _ = reply.send(res);
            }
            DbMessage::ListAlgorithms(active_only, reply) => {
                let res = self.list_algorithms(&state.pool, active_only).await;
                let _ = reply.send(res);
            }
            DbMessage::PatchAlgorithm(id, patch, reply) => {
                let res = self.patch_algorithm(&state.pool, &id, patch).await;
                let _ = reply.send(res);
            }
            DbMessage::DeleteAlgorithm(id, reply) => {
                let res = self.delete_algorithm(&state.pool, &id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn create_file(
        &self,
        pool: &SqlitePool,
        create: FileCreate,
    ) -> Result<DbFileRecord, PortalError> {
        let now = Utc::now();

        sqlx::query(
            r#"
        INSERT INTO files (
            id, title, description, file_url, category, file_type, file_size, original_filename, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(&create.id)
        .bind(&create.title)
        .bind(&create.description)
        .bind(&create.file_url)
        .bind(create.category)
        .bind(create.file_type)
        .bind(create.file_size)
        .bind(&create.original_filename)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let row = self
            .get_file(pool, &create.id)
            .await?
            .ok_or(PortalError::NotFound("File"))?;
        Ok(row)
    }

    async fn get_file(
        &self,
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<DbFileRecord>, PortalError> {
        let row = sqlx::query_as::<_, DbFileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn list_files(
        &self,
        pool: &SqlitePool,
        query: &FileListQuery,
    ) -> Result<FilePage, PortalError> {
        let order_col = query.sort_by.column();
        let order_dir = query.sort_order.keyword();

        let (files, total) = if let Some(category) = query.category {
            let sql = format!(
                "SELECT {FILE_COLUMNS} FROM files WHERE category = ? ORDER BY {order_col} {order_dir} LIMIT ? OFFSET ?"
            );
            let files = sqlx::query_as::<_, DbFileRecord>(&sql)
                .bind(category)
                .bind(i64::from(query.limit))
                .bind(query.offset())
                .fetch_all(pool)
                .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE category = ?")
                .bind(category)
                .fetch_one(pool)
                .await?;

            (files, total)
        } else {
            let sql = format!(
                "SELECT {FILE_COLUMNS} FROM files ORDER BY {order_col} {order_dir} LIMIT ? OFFSET ?"
            );
            let files = sqlx::query_as::<_, DbFileRecord>(&sql)
                .bind(i64::from(query.limit))
                .bind(query.offset())
                .fetch_all(pool)
                .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
                .fetch_one(pool)
                .await?;

            (files, total)
        };

        Ok(FilePage { files, total })
    }

    async fn list_all_files(&self, pool: &SqlitePool) -> Result<Vec<DbFileRecord>, PortalError> {
        let rows = sqlx::query_as::<_, DbFileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn patch_file(
        &self,
        pool: &SqlitePool,
        id: &str,
        patch: FilePatch,
    ) -> Result<Option<DbFileRecord>, PortalError> {
        let FilePatch {
            title,
            description,
            category,
        } = patch;

        let title_set = title.is_some();
        let description_set = description.is_some();
        let category_set = category.is_some();
        let updated_at = Utc::now();

        // Nullable columns use a presence flag so a present-but-empty value
        // clears the column; non-nullable columns use COALESCE.
        let res = sqlx::query(
            r#"
        UPDATE files
        SET
            title = COALESCE(?, title),
            description = CASE WHEN ? THEN NULLIF(?, '') ELSE description END,
            category = COALESCE(?, category),
            updated_at = ?
        WHERE id = ?
        "#,
        )
        .bind(title)
        .bind(description_set)
        .bind(description.unwrap_or_default())
        .bind(category)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;

        let affected = res.rows_affected();
        debug!(
            id,
            affected,
            updated_at = %updated_at,
            title_set,
            description_set,
            category_set,
            "file patch applied"
        );

        if affected == 0 {
            return Ok(None);
        }
        self.get_file(pool, id).await
    }

    async fn delete_file(
        &self,
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<DbFileRecord>, PortalError> {
        let Some(row) = self.get_file(pool, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(Some(row))
    }

    async fn create_algorithm(
        &self,
        pool: &SqlitePool,
        create: AlgorithmCreate,
    ) -> Result<DbAlgorithmRecord, PortalError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let sort_order = match create.sort_order {
            Some(v) => v,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM algorithms",
                )
                .fetch_one(pool)
                .await?
            }
        };

        sqlx::query(
            r#"
        INSERT INTO algorithms (
            id, title, short_title, icon_type, image_url, sort_order, is_active, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(&id)
        .bind(&create.title)
        .bind(&create.short_title)
        .bind(create.icon_type)
        .bind(&create.image_url)
        .bind(sort_order)
        .bind(create.is_active.unwrap_or(true))
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let row = self
            .get_algorithm(pool, &id)
            .await?
            .ok_or(PortalError::NotFound("Algorithm"))?;
        Ok(row)
    }

    async fn get_algorithm(
        &self,
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        let row = sqlx::query_as::<_, DbAlgorithmRecord>(&format!(
            "SELECT {ALGORITHM_COLUMNS} FROM algorithms WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn list_algorithms(
        &self,
        pool: &SqlitePool,
        active_only: bool,
    ) -> Result<Vec<DbAlgorithmRecord>, PortalError> {
        // Ties on sort_order stay stable by insertion (rowid) order.
        let sql = if active_only {
            format!(
                "SELECT {ALGORITHM_COLUMNS} FROM algorithms WHERE is_active = 1 ORDER BY sort_order ASC"
            )
        } else {
            format!("SELECT {ALGORITHM_COLUMNS} FROM algorithms ORDER BY sort_order ASC")
        };

        let rows = sqlx::query_as::<_, DbAlgorithmRecord>(&sql)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    async fn patch_algorithm(
        &self,
        pool: &SqlitePool,
        id: &str,
        patch: AlgorithmPatch,
    ) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        let AlgorithmPatch {
            title,
            short_title,
            icon_type,
            image_url,
            sort_order,
            is_active,
        } = patch;

        let image_url_set = image_url.is_some();
        let updated_at = Utc::now();

        let res = sqlx::query(
            r#"
        UPDATE algorithms
        SET
            title = COALESCE(?, title),
            short_title = COALESCE(?, short_title),
            icon_type = COALESCE(?, icon_type),
            image_url = CASE WHEN ? THEN NULLIF(?, '') ELSE image_url END,
            sort_order = COALESCE(?, sort_order),
            is_active = COALESCE(?, is_active),
            updated_at = ?
        WHERE id = ?
        "#,
        )
        .bind(title)
        .bind(short_title)
        .bind(icon_type)
        .bind(image_url_set)
        .bind(image_url.unwrap_or_default())
        .bind(sort_order)
        .bind(is_active)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_algorithm(pool, id).await
    }

    async fn delete_algorithm(
        &self,
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<DbAlgorithmRecord>, PortalError> {
        let Some(row) = self.get_algorithm(pool, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM algorithms WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(Some(row))
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbHandle {
    // Anonymous spawn: the name registry is process-wide and handles are
    // passed around explicitly anyway.
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), PortalError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
