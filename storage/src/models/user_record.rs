//! User row: login, password hash and the user's current session.
//!
//! Maps to the `users` table and is used by UserRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub login: String,
    /// PHC-format password hash; never the plaintext password.
    pub password_hash: String,
    /// Current or most recent session. May point at a session that no longer exists.
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new record with a generated UUID and no session yet.
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            login: login.into(),
            password_hash: password_hash.into(),
            session_id: None,
            created_at: Utc::now(),
        }
    }
}
