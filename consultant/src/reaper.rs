//! Session Reaper: periodic sweep that evicts idle anonymous sessions and compacts idle
//! registered ones into a keyword context.
//!
//! Per session and sweep: active → nothing; idle anonymous → log dropped, session deleted;
//! idle registered and not compacted → history summarized through the gateway (system role)
//! and stored as context, log kept. Failures are logged and retried on the next sweep.

use chrono::{DateTime, Utc};
use llm_gateway::{LlmGateway, MessageRole};
use prompt::compaction_instruction;
use std::sync::Arc;
use std::time::Duration;
use storage::SessionRecord;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::context::render_history;
use crate::core::{ConsultantError, Result};
use crate::session::{SessionLocks, SessionStore};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub evicted: usize,
    pub compacted: usize,
    pub failed: usize,
}

/// Summarizes a session's history into its stored context.
#[derive(Clone)]
pub struct Compactor {
    sessions: SessionStore,
    gateway: Arc<dyn LlmGateway>,
}

impl Compactor {
    pub fn new(sessions: SessionStore, gateway: Arc<dyn LlmGateway>) -> Self {
        Self { sessions, gateway }
    }

    /// Compacts the history of `session_id` and marks the session compacted.
    /// An empty history is stored as an empty context without calling the gateway.
    #[instrument(skip(self))]
    pub async fn compact(&self, session_id: &str) -> Result<String> {
        let storage = self.sessions.storage();
        let history = render_history(&storage.messages, session_id).await?;

        let keywords = if history.is_empty() {
            info!(session_id = %session_id, "User did not send any messages in the session");
            String::new()
        } else {
            let reply = self
                .gateway
                .complete(&compaction_instruction(&history), MessageRole::System)
                .await?;
            reply.trim().to_string()
        };

        if !storage.sessions.save_context(session_id, &keywords).await? {
            return Err(ConsultantError::SessionNotFound(session_id.to_string()));
        }
        info!(session_id = %session_id, keywords = %keywords, "Saved compacted context");
        Ok(keywords)
    }
}

pub struct Reaper {
    sessions: SessionStore,
    compactor: Compactor,
    locks: Arc<SessionLocks>,
    interval: Duration,
}

impl Reaper {
    pub fn new(
        sessions: SessionStore,
        compactor: Compactor,
        locks: Arc<SessionLocks>,
        interval: Duration,
    ) -> Self {
        Self {
            sessions,
            compactor,
            locks,
            interval,
        }
    }

    /// One sweep at the current time.
    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// One sweep treating `now` as the current time.
    #[instrument(skip(self))]
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let timeout = chrono::Duration::from_std(self.sessions.idle_timeout())
            .map_err(|e| ConsultantError::Config(e.to_string()))?;
        let sessions = self.sessions.storage().sessions.list_all().await?;

        let mut report = SweepReport {
            scanned: sessions.len(),
            ..SweepReport::default()
        };

        for session in sessions.iter().filter(|s| s.is_idle(now, timeout)) {
            if session.is_registered && session.context_compacted {
                continue;
            }
            let _guard = self.locks.lock(&session.id).await;
            // Re-read under the lock: a message may have arrived since the listing.
            let current = match self.sessions.storage().sessions.find(&session.id).await {
                Ok(Some(current)) if current.is_idle(now, timeout) => current,
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, session_id = %session.id, "Failed to reload session");
                    report.failed += 1;
                    continue;
                }
            };
            match self.reap(&current).await {
                Ok(Outcome::Evicted) => report.evicted += 1,
                Ok(Outcome::Compacted) => report.compacted += 1,
                Ok(Outcome::Skipped) => {}
                Err(e) => {
                    warn!(error = %e, session_id = %current.id, "Sweep failed for session; will retry");
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            evicted = report.evicted,
            compacted = report.compacted,
            failed = report.failed,
            "Sweep finished"
        );
        Ok(report)
    }

    async fn reap(&self, session: &SessionRecord) -> Result<Outcome> {
        if !session.is_registered {
            self.sessions.discard(&session.id).await?;
            return Ok(Outcome::Evicted);
        }
        if session.context_compacted {
            return Ok(Outcome::Skipped);
        }
        self.compactor.compact(&session.id).await?;
        Ok(Outcome::Compacted)
    }

    /// Runs sweeps every interval (the immediate first tick is skipped) until the handle is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            info!(interval_secs = self.interval.as_secs(), "Session reaper started");
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    error!(error = %e, "Sweep failed");
                }
            }
        })
    }
}

enum Outcome {
    Evicted,
    Compacted,
    Skipped,
}
