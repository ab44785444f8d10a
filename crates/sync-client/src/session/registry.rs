//! Session registry
//!
//! Owns at most one synchronization session per ticket. Uses `DashMap` for
//! concurrent access from whatever drives the UI.

use std::sync::Arc;

use dashmap::DashMap;

use sync_common::{SyncConfig, SyncResult};
use sync_core::TicketId;

use super::session::ThreadSyncSession;

/// Registry of active per-ticket sessions
pub struct SessionRegistry {
    config: Arc<SyncConfig>,
    sessions: DashMap<TicketId, Arc<ThreadSyncSession>>,
}

impl SessionRegistry {
    /// Create a registry for a service configuration
    #[must_use]
    pub fn new(config: Arc<SyncConfig>) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    /// Create a registry wrapped in Arc
    #[must_use]
    pub fn new_shared(config: Arc<SyncConfig>) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Open (or return the already-open) session for a ticket
    ///
    /// Opening while a previous teardown for the same ticket is still
    /// settling is safe: the new session is a fresh instance and its
    /// supervisor carries its own connect guard.
    pub async fn open(&self, ticket_id: TicketId) -> SyncResult<Arc<ThreadSyncSession>> {
        if let Some(existing) = self.sessions.get(&ticket_id) {
            return Ok(Arc::clone(&existing));
        }

        let session = Arc::new(ThreadSyncSession::new(ticket_id, Arc::clone(&self.config))?);
        session.start().await?;
        self.sessions.insert(ticket_id, Arc::clone(&session));

        tracing::debug!(ticket_id = %ticket_id, "session opened");

        Ok(session)
    }

    /// Get an open session without creating one
    pub fn get(&self, ticket_id: TicketId) -> Option<Arc<ThreadSyncSession>> {
        self.sessions.get(&ticket_id).map(|s| Arc::clone(&s))
    }

    /// Close and remove a ticket's session; returns whether one was open
    pub fn close(&self, ticket_id: TicketId) -> bool {
        if let Some((_, session)) = self.sessions.remove(&ticket_id) {
            session.stop();
            tracing::debug!(ticket_id = %ticket_id, "session closed");
            true
        } else {
            false
        }
    }

    /// Close every open session
    pub fn close_all(&self) {
        let tickets: Vec<TicketId> = self.sessions.iter().map(|e| *e.key()).collect();
        for ticket_id in tickets {
            self.close(ticket_id);
        }
    }

    /// Number of open sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
