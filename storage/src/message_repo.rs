//! Message Log: durable append-only record of (question, answer) turns per session.
//!
//! One `messages` table keyed by `session_id` (indexed); insertion order is retrieval order.
//! External: SQLite via sqlx; callers use ensure/append/read_all/drop_all.

use crate::error::StorageError;
use crate::models::TurnRecord;
use crate::sqlite_pool::SqlitePoolManager;
use chrono::Utc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    /// Wraps an existing pool and creates the `messages` table if missing.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_session_id ON messages(session_id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Makes sure storage for `session_id` exists. Idempotent; never touches stored turns.
    #[instrument(skip(self))]
    pub async fn ensure(&self, session_id: &str) -> Result<(), StorageError> {
        self.init().await?;
        debug!(session_id = %session_id, "Message log ready");
        Ok(())
    }

    /// Appends one turn to the session's log.
    #[instrument(skip(self, question, answer))]
    pub async fn append(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO messages (session_id, question, answer, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(question)
        .bind(answer)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        info!(session_id = %session_id, "Message and response saved");
        Ok(())
    }

    /// Returns every turn of the session in insertion order; empty when there are none.
    pub async fn read_all(&self, session_id: &str) -> Result<Vec<TurnRecord>, StorageError> {
        let turns = sqlx::query_as::<_, TurnRecord>(
            "SELECT seq, session_id, question, answer, created_at FROM messages WHERE session_id = ? ORDER BY seq ASC",
        )
        .bind(session_id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        debug!(session_id = %session_id, count = turns.len(), "Read message log");
        Ok(turns)
    }

    /// Number of turns stored for the session.
    pub async fn count(&self, session_id: &str) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(count)
    }

    /// Copies all turns of `from` onto the end of `to`, preserving order. Returns the number copied.
    #[instrument(skip(self))]
    pub async fn copy_all(&self, from: &str, to: &str) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (session_id, question, answer, created_at)
            SELECT ?, question, answer, created_at FROM messages WHERE session_id = ? ORDER BY seq ASC
            "#,
        )
        .bind(to)
        .bind(from)
        .execute(self.pool_manager.pool())
        .await?;

        info!(from = %from, to = %to, copied = result.rows_affected(), "Copied message log");
        Ok(result.rows_affected())
    }

    /// Irreversibly deletes every turn of the session. Returns the number deleted.
    #[instrument(skip(self))]
    pub async fn drop_all(&self, session_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool_manager.pool())
            .await?;

        info!(
            session_id = %session_id,
            deleted = result.rows_affected(),
            "Dropped message log"
        );
        Ok(result.rows_affected())
    }
}
