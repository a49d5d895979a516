//! Session row: conversation identity, activity timestamp, registration status and compacted context.
//!
//! Maps to the `sessions` table and is used by SessionRepository.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: String,
    /// Owning user for registered sessions.
    pub user_id: Option<String>,
    pub is_registered: bool,
    /// Compacted keyword summary; empty until the session is compacted.
    pub context: String,
    pub context_compacted: bool,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Creates an anonymous session with a fresh UUID, active now.
    pub fn anonymous() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            is_registered: false,
            context: String::new(),
            context_compacted: false,
            last_active: now,
            created_at: now,
        }
    }

    /// Creates a registered session owned by `user_id`, active now.
    pub fn registered(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_registered: true,
            ..Self::anonymous()
        }
    }

    /// True when the session has been inactive for strictly longer than `timeout` at `now`.
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_active > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_starts_unregistered_with_empty_context() {
        let session = SessionRecord::anonymous();
        assert!(!session.is_registered);
        assert!(session.user_id.is_none());
        assert_eq!(session.context, "");
        assert!(!session.context_compacted);
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn registered_session_gets_its_own_id() {
        let a = SessionRecord::registered("u1");
        let b = SessionRecord::registered("u1");
        assert!(a.is_registered);
        assert_eq!(a.user_id.as_deref(), Some("u1"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn idle_is_strictly_longer_than_timeout() {
        let session = SessionRecord::anonymous();
        let timeout = Duration::minutes(15);
        assert!(!session.is_idle(session.last_active + timeout, timeout));
        assert!(session.is_idle(session.last_active + timeout + Duration::seconds(1), timeout));
        assert!(!session.is_idle(session.last_active, timeout));
    }
}
