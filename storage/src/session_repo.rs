//! Session repository: persistence for [`SessionRecord`] rows.

use crate::error::StorageError;
use crate::models::SessionRecord;
use crate::sqlite_pool::SqlitePoolManager;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

const SESSION_COLUMNS: &str =
    "id, user_id, is_registered, context, context_compacted, last_active, created_at";

#[derive(Clone)]
pub struct SessionRepository {
    pool_manager: SqlitePoolManager,
}

impl SessionRepository {
    /// Wraps an existing pool and creates the `sessions` table if missing.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                is_registered INTEGER NOT NULL DEFAULT 0,
                context TEXT NOT NULL DEFAULT '',
                context_compacted INTEGER NOT NULL DEFAULT 0,
                last_active TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn insert(&self, session: &SessionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, is_registered, context, context_compacted, last_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.is_registered)
        .bind(&session.context)
        .bind(session.context_compacted)
        .bind(session.last_active)
        .bind(session.created_at)
        .execute(self.pool_manager.pool())
        .await
        .map_err(|e| StorageError::from_insert(e, format!("session {}", session.id)))?;

        info!(
            session_id = %session.id,
            is_registered = session.is_registered,
            "Session created"
        );
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        let sql = format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS);
        let session = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(session)
    }

    /// All sessions, oldest activity first.
    pub async fn list_all(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let sql = format!("SELECT {} FROM sessions ORDER BY last_active ASC", SESSION_COLUMNS);
        let sessions = sqlx::query_as::<_, SessionRecord>(&sql)
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(sessions)
    }

    /// Records activity at `at` and clears the compacted flag. Returns false if no such session.
    pub async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE sessions SET last_active = ?, context_compacted = 0 WHERE id = ?",
        )
        .bind(at)
        .bind(id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sets `last_active` without touching the compacted flag.
    pub async fn set_last_active(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE sessions SET last_active = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stores the compacted context and marks the session compacted.
    #[instrument(skip(self, context))]
    pub async fn save_context(&self, id: &str, context: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE sessions SET context = ?, context_compacted = 1 WHERE id = ?",
        )
        .bind(context)
        .bind(id)
        .execute(self.pool_manager.pool())
        .await?;

        info!(session_id = %id, "Context for session has been saved");
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
