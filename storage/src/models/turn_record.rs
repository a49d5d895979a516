//! Message Log row: one (question, answer) turn of a session.
//!
//! Maps to the `messages` table and is used by MessageRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TurnRecord {
    /// Insertion sequence; retrieval order is ascending `seq`.
    pub seq: i64,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}
