//! User repository: registered users and their current session.

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::sqlite_pool::SqlitePoolManager;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    /// Wraps an existing pool and creates the `users` table if missing.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                login TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                session_id TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    /// Inserts a user. Fails with [`StorageError::AlreadyExists`] when the login is taken.
    #[instrument(skip(self, user), fields(login = %user.login))]
    pub async fn insert(&self, user: &UserRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, login, password_hash, session_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(&user.session_id)
        .bind(user.created_at)
        .execute(self.pool_manager.pool())
        .await
        .map_err(|e| StorageError::from_insert(e, format!("user {}", user.login)))?;

        info!(user_id = %user.user_id, "User registered");
        Ok(())
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, login, password_hash, session_id, created_at FROM users WHERE login = ?",
        )
        .bind(login)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(user)
    }

    /// Points the user at `session_id`.
    pub async fn set_session(&self, user_id: &str, session_id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET session_id = ? WHERE user_id = ?")
            .bind(session_id)
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }
}
