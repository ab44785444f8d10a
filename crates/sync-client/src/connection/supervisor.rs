//! Connection supervisor
//!
//! Owns the lifecycle of one ticket's event-stream connection: a guarded
//! connect path (no overlapping attempts), a single pending reconnect timer
//! after abnormal closure, and an intentional, non-reconnecting shutdown
//! with close code 1000. Rapid re-invocation of `connect()` from a consumer
//! that re-subscribes in a loop must never leak sockets or double-fire
//! reconnects; the guard flag and the single-timer invariant carry that.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use uuid::Uuid;

use sync_common::{SyncConfig, SyncError, SyncResult};
use sync_core::{CommentEvent, TicketId};

use crate::protocol::CloseCode;

use super::stream::EventStreamClient;

/// Supervises one ticket's event-stream connection
#[derive(Clone)]
pub struct ConnectionSupervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    ticket_id: TicketId,
    stream_url: String,
    origin: String,
    reconnect_delay: Duration,
    events_tx: mpsc::Sender<CommentEvent>,

    /// Guards against overlapping connect attempts
    connect_in_flight: AtomicBool,
    /// Whether a connection is currently open
    live: AtomicBool,
    /// Whether the session still wants a connection (cleared by disconnect)
    active: AtomicBool,
    /// Intentional-shutdown signal observed by the read loop
    shutdown: watch::Sender<bool>,
    /// At most one pending reconnect timer
    reconnect_timer: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionSupervisor {
    /// Create a supervisor for a ticket's stream
    pub fn new(
        ticket_id: TicketId,
        config: &SyncConfig,
        events_tx: mpsc::Sender<CommentEvent>,
    ) -> SyncResult<Self> {
        let stream_url = config
            .service
            .stream_url(ticket_id)
            .map_err(|e| SyncError::Config(e.to_string()))?;
        let origin = config
            .service
            .origin()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(SupervisorInner {
                ticket_id,
                stream_url,
                origin,
                reconnect_delay: config.stream.reconnect_delay(),
                events_tx,
                connect_in_flight: AtomicBool::new(false),
                live: AtomicBool::new(false),
                active: AtomicBool::new(false),
                shutdown,
                reconnect_timer: Mutex::new(None),
            }),
        })
    }

    /// Start a connection attempt
    ///
    /// A no-op while an attempt is already in flight or a connection is
    /// already open.
    pub fn connect(&self) {
        SupervisorInner::spawn_connect(&self.inner);
    }

    /// Shut the connection down intentionally
    ///
    /// Cancels any pending reconnect timer, clears the connect guard, closes
    /// with code 1000, and marks the stream not live. Calling it twice is a
    /// no-op.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let was_active = inner.active.swap(false, Ordering::SeqCst);
        if !was_active
            && !inner.live.load(Ordering::SeqCst)
            && !inner.connect_in_flight.load(Ordering::SeqCst)
        {
            return;
        }

        inner.cancel_pending_reconnect();
        inner.connect_in_flight.store(false, Ordering::SeqCst);
        // send_replace updates the value even with no read loop subscribed
        // yet, so a disconnect during Connecting still lands
        inner.shutdown.send_replace(true);
        inner.live.store(false, Ordering::SeqCst);

        tracing::info!(ticket_id = %inner.ticket_id, "event stream disconnect requested");
    }

    /// Whether the stream is currently open
    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Whether a reconnect timer is pending
    pub fn has_pending_reconnect(&self) -> bool {
        self.inner
            .reconnect_timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl SupervisorInner {
    fn spawn_connect(self: &Arc<Self>) {
        if self.live.load(Ordering::SeqCst) {
            return;
        }
        if self.connect_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(ticket_id = %self.ticket_id, "connect attempt already in flight");
            return;
        }

        self.active.store(true, Ordering::SeqCst);
        self.shutdown.send_replace(false);

        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.run_connection().await });
    }

    async fn run_connection(self: Arc<Self>) {
        let connection_id = Uuid::new_v4();
        tracing::debug!(
            ticket_id = %self.ticket_id,
            connection_id = %connection_id,
            url = %self.stream_url,
            "connecting event stream"
        );

        match connect_async(self.stream_url.as_str()).await {
            Ok((ws, _response)) => {
                self.connect_in_flight.store(false, Ordering::SeqCst);
                self.cancel_pending_reconnect();
                self.live.store(true, Ordering::SeqCst);
                tracing::info!(
                    ticket_id = %self.ticket_id,
                    connection_id = %connection_id,
                    "event stream open"
                );

                let client =
                    EventStreamClient::new(self.events_tx.clone(), self.origin.clone());
                let close_code = client.run(ws, self.shutdown.subscribe()).await;
                self.live.store(false, Ordering::SeqCst);

                let code = close_code.unwrap_or(CloseCode::Abnormal.as_u16());
                if CloseCode::should_reconnect(code) && self.active.load(Ordering::SeqCst) {
                    tracing::warn!(
                        ticket_id = %self.ticket_id,
                        connection_id = %connection_id,
                        code,
                        "event stream closed abnormally"
                    );
                    self.schedule_reconnect();
                } else {
                    tracing::info!(
                        ticket_id = %self.ticket_id,
                        connection_id = %connection_id,
                        code,
                        "event stream closed"
                    );
                }
            }
            Err(err) => {
                self.connect_in_flight.store(false, Ordering::SeqCst);
                self.live.store(false, Ordering::SeqCst);
                tracing::warn!(
                    ticket_id = %self.ticket_id,
                    connection_id = %connection_id,
                    error = %err,
                    "event stream connect failed"
                );
                if self.active.load(Ordering::SeqCst) {
                    self.schedule_reconnect();
                }
            }
        }
    }

    /// Schedule exactly one reconnect attempt after the fixed delay
    fn schedule_reconnect(self: &Arc<Self>) {
        let mut timer = self.reconnect_timer.lock();
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!(ticket_id = %self.ticket_id, "reconnect already pending");
            return;
        }

        tracing::info!(
            ticket_id = %self.ticket_id,
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "scheduling reconnect"
        );

        let inner = Arc::clone(self);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.reconnect_delay).await;
            if inner.active.load(Ordering::SeqCst) {
                Self::spawn_connect(&inner);
            }
        }));
    }

    fn cancel_pending_reconnect(&self) {
        if let Some(handle) = self.reconnect_timer.lock().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ConnectionSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("ticket_id", &self.inner.ticket_id)
            .field("live", &self.inner.live.load(Ordering::SeqCst))
            .field("active", &self.inner.active.load(Ordering::SeqCst))
            .finish()
    }
}
