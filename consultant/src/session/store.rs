//! Session Store over the `sessions`, `users` and `messages` repositories.
//!
//! The database is the only authority; nothing is cached in memory.

use chrono::{DateTime, Utc};
use std::time::Duration;
use storage::{SessionRecord, Storage, UserRecord};
use tracing::{error, info, instrument, warn};

use super::credentials::{hash_password, verify_password, Credentials};
use crate::core::{ConsultantError, Result};

#[derive(Clone)]
pub struct SessionStore {
    storage: Storage,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(storage: Storage, idle_timeout: Duration) -> Self {
        Self {
            storage,
            idle_timeout,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the session for `token`, or creates a new anonymous one when the token is
    /// absent, blank or unknown. A lookup failure is logged and treated as unknown.
    #[instrument(skip(self))]
    pub async fn resolve(&self, token: Option<&str>) -> Result<SessionRecord> {
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            match self.storage.sessions.find(token).await {
                Ok(Some(session)) => return Ok(session),
                Ok(None) => info!(session_id = %token, "Unknown session token, issuing new session"),
                Err(e) => error!(error = %e, session_id = %token, "Session lookup failed, issuing new session"),
            }
        }
        self.create_anonymous().await
    }

    /// Existing session for `id`, or [`ConsultantError::SessionNotFound`].
    pub async fn get(&self, id: &str) -> Result<SessionRecord> {
        self.storage
            .sessions
            .find(id)
            .await?
            .ok_or_else(|| ConsultantError::SessionNotFound(id.to_string()))
    }

    async fn create_anonymous(&self) -> Result<SessionRecord> {
        let session = SessionRecord::anonymous();
        self.storage.sessions.insert(&session).await?;
        self.storage.messages.ensure(&session.id).await?;
        info!(session_id = %session.id, "Anonymous session created");
        Ok(session)
    }

    async fn create_registered(&self, user_id: &str) -> Result<SessionRecord> {
        let session = SessionRecord::registered(user_id);
        self.storage.sessions.insert(&session).await?;
        self.storage.messages.ensure(&session.id).await?;
        self.storage.users.set_session(user_id, &session.id).await?;
        Ok(session)
    }

    /// Marks activity now and clears the compacted flag. Best-effort: failures are logged.
    pub async fn touch(&self, id: &str) {
        self.touch_at(id, Utc::now()).await
    }

    pub async fn touch_at(&self, id: &str, at: DateTime<Utc>) {
        match self.storage.sessions.touch(id, at).await {
            Ok(true) => {}
            Ok(false) => warn!(session_id = %id, "Touch on missing session"),
            Err(e) => error!(error = %e, session_id = %id, "Failed to update session activity"),
        }
    }

    /// Moves an anonymous session's history into a new registered session owned by a new user.
    ///
    /// Turns are copied in order before the anonymous log and session are deleted.
    /// Fails with [`ConsultantError::AlreadyRegistered`] when the login is taken.
    #[instrument(skip(self, credentials), fields(login = %credentials.login()))]
    pub async fn promote(
        &self,
        anonymous_id: &str,
        credentials: &Credentials,
    ) -> Result<SessionRecord> {
        if self
            .storage
            .users
            .find_by_login(credentials.login())
            .await?
            .is_some()
        {
            return Err(ConsultantError::AlreadyRegistered(credentials.login().to_string()));
        }

        let user = UserRecord::new(credentials.login(), hash_password(credentials.password())?);
        self.storage.users.insert(&user).await.map_err(|e| match e {
            storage::StorageError::AlreadyExists(_) => {
                ConsultantError::AlreadyRegistered(credentials.login().to_string())
            }
            other => other.into(),
        })?;

        let session = self.create_registered(&user.user_id).await?;
        let copied = self
            .storage
            .messages
            .copy_all(anonymous_id, &session.id)
            .await?;
        self.discard(anonymous_id).await?;

        info!(
            user_id = %user.user_id,
            session_id = %session.id,
            anonymous_id = %anonymous_id,
            copied,
            "Anonymous session promoted to registered"
        );
        Ok(session)
    }

    /// Returns the user's current session after refreshing its activity.
    ///
    /// Unknown login or wrong password is [`ConsultantError::UserNotFound`]. A dangling
    /// session reference gets a fresh registered session.
    #[instrument(skip(self, credentials), fields(login = %credentials.login()))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionRecord> {
        let user = self
            .storage
            .users
            .find_by_login(credentials.login())
            .await?
            .filter(|u| verify_password(credentials.password(), &u.password_hash))
            .ok_or_else(|| ConsultantError::UserNotFound(credentials.login().to_string()))?;

        let existing = match &user.session_id {
            Some(id) => self.storage.sessions.find(id).await?,
            None => None,
        };

        let session = match existing {
            Some(session) => {
                self.touch(&session.id).await;
                self.get(&session.id).await?
            }
            None => {
                info!(user_id = %user.user_id, "User session missing, creating a new one");
                self.create_registered(&user.user_id).await?
            }
        };

        info!(user_id = %user.user_id, session_id = %session.id, "User logged in");
        Ok(session)
    }

    /// Drops the session's message log and deletes the session.
    #[instrument(skip(self))]
    pub async fn discard(&self, id: &str) -> Result<()> {
        self.storage.messages.drop_all(id).await?;
        self.storage.sessions.delete(id).await?;
        info!(session_id = %id, "Session discarded");
        Ok(())
    }

    /// Pushes `last_active` back by the idle timeout so the next sweep sees the session as idle.
    pub async fn expire(&self, id: &str) -> Result<()> {
        let timeout = chrono::Duration::from_std(self.idle_timeout)
            .map_err(|e| ConsultantError::Config(e.to_string()))?;
        self.storage
            .sessions
            .set_last_active(id, Utc::now() - timeout)
            .await?;
        Ok(())
    }
}
