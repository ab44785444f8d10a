//! Thread synchronization session
//!
//! One session per ticket, with an explicit `start()`/`stop()` lifetime.
//! `start()` seeds the tree from a snapshot page, spawns the apply loop, and
//! connects the event stream; every input channel — stream frames and the
//! dispatcher's write confirmations — funnels through one bounded channel
//! consumed by that loop, so `apply` invocations are serialized by
//! construction and the published tree never tears.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sync_common::{SyncConfig, SyncError, SyncResult};
use sync_core::{
    CommentEvent, CommentId, CommentThread, DocumentId, Reconciler, TicketId, UserId,
};

use crate::connection::ConnectionSupervisor;
use crate::dispatch::{DocumentUpload, MutationDispatcher, NewComment};
use crate::snapshot::SnapshotLoader;

/// A per-ticket synchronization session
pub struct ThreadSyncSession {
    ticket_id: TicketId,
    state: Arc<RwLock<CommentThread>>,
    events_tx: mpsc::Sender<CommentEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<CommentEvent>>>,
    apply_task: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    supervisor: ConnectionSupervisor,
    loader: SnapshotLoader,
    dispatcher: MutationDispatcher,
}

impl ThreadSyncSession {
    /// Create a session for a ticket
    ///
    /// The ticket id is mandatory by construction; there is no way to reach
    /// the network without one.
    pub fn new(ticket_id: TicketId, config: Arc<SyncConfig>) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.service.request_timeout())
            .build()
            .map_err(SyncError::internal)?;

        let (events_tx, events_rx) = mpsc::channel(config.stream.channel_capacity);
        let supervisor = ConnectionSupervisor::new(ticket_id, &config, events_tx.clone())?;
        let loader = SnapshotLoader::new(http.clone(), Arc::clone(&config))?;
        let dispatcher = MutationDispatcher::new(http, Arc::clone(&config))?;

        Ok(Self {
            ticket_id,
            state: Arc::new(RwLock::new(CommentThread::new(ticket_id))),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            apply_task: Mutex::new(None),
            started: AtomicBool::new(false),
            supervisor,
            loader,
            dispatcher,
        })
    }

    /// The ticket this session synchronizes
    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Seed the tree from the snapshot, spawn the apply loop, and connect
    /// the event stream
    ///
    /// Calling `start()` again while running is a no-op. A snapshot failure
    /// leaves the tree empty and the session stopped; the caller may retry.
    pub async fn start(&self) -> SyncResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let page = match self.loader.load(self.ticket_id, None).await {
            Ok(page) => page,
            Err(err) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };

        let Some(mut events_rx) = self.events_rx.lock().take() else {
            self.started.store(false, Ordering::SeqCst);
            return Err(SyncError::internal(anyhow::anyhow!(
                "session cannot be restarted; open a new one"
            )));
        };

        let mut engine = Reconciler::new(self.ticket_id);
        engine.seed(page.comments, page.pagination);
        *self.state.write() = engine.thread().clone();

        tracing::info!(
            ticket_id = %self.ticket_id,
            roots = engine.thread().roots.len(),
            count = engine.thread().pagination.count,
            "session seeded from snapshot"
        );

        let state = Arc::clone(&self.state);
        let ticket_id = self.ticket_id;
        let handle = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let action = event.action;
                let comment_id = event.comment.id;
                let outcome = engine.apply(event);

                tracing::debug!(
                    ticket_id = %ticket_id,
                    comment_id = %comment_id,
                    action = %action,
                    outcome = ?outcome,
                    "event applied"
                );

                if outcome.changed() {
                    *state.write() = engine.thread().clone();
                }
            }
        });
        *self.apply_task.lock() = Some(handle);

        self.supervisor.connect();
        Ok(())
    }

    /// Shut the session down
    ///
    /// Disconnects the stream with the normal close code (no reconnect will
    /// be scheduled) and stops the apply loop. Idempotent.
    pub fn stop(&self) {
        self.supervisor.disconnect();
        if let Some(handle) = self.apply_task.lock().take() {
            handle.abort();
        }
        if self.started.swap(false, Ordering::SeqCst) {
            tracing::info!(ticket_id = %self.ticket_id, "session stopped");
        }
    }

    /// A point-in-time clone of the canonical tree
    pub fn snapshot(&self) -> CommentThread {
        self.state.read().clone()
    }

    /// Whether the event stream is currently open
    pub fn is_live(&self) -> bool {
        self.supervisor.is_live()
    }

    /// Whether the session has been started and not stopped
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Post a new root comment for this ticket
    pub async fn create_comment(&self, user_id: UserId, content: &str) -> SyncResult<()> {
        let new = NewComment::new(self.ticket_id, user_id, content);
        let event = self.dispatcher.create_comment(&new).await?;
        self.submit(event).await
    }

    /// Post a reply under a root comment
    pub async fn add_reply(
        &self,
        user_id: UserId,
        parent: CommentId,
        content: &str,
    ) -> SyncResult<()> {
        let new = NewComment::reply_to(self.ticket_id, user_id, parent, content);
        let event = self.dispatcher.add_reply(&new).await?;
        self.submit(event).await
    }

    /// Post a new comment with attached documents
    pub async fn create_comment_with_documents(
        &self,
        user_id: UserId,
        content: &str,
        documents: Vec<DocumentUpload>,
    ) -> SyncResult<()> {
        let new = NewComment::new(self.ticket_id, user_id, content);
        let event = self
            .dispatcher
            .create_comment_with_documents(&new, documents)
            .await?;
        self.submit(event).await
    }

    /// Set the viewer's reaction on a comment
    pub async fn set_reaction(
        &self,
        comment_id: CommentId,
        user_id: UserId,
        symbol: &str,
    ) -> SyncResult<()> {
        let event = self.dispatcher.set_reaction(comment_id, user_id, symbol).await?;
        self.submit(event).await
    }

    /// Clear the viewer's reaction on a comment
    pub async fn clear_reaction(&self, comment_id: CommentId, user_id: UserId) -> SyncResult<()> {
        let event = self.dispatcher.clear_reaction(comment_id, user_id).await?;
        self.submit(event).await
    }

    /// Delete a comment or reply
    pub async fn delete_comment(&self, comment_id: CommentId) -> SyncResult<()> {
        let event = self.dispatcher.delete_comment(comment_id).await?;
        self.submit(event).await
    }

    /// Attach a document to an existing comment
    pub async fn attach_document(
        &self,
        comment_id: CommentId,
        document: DocumentUpload,
    ) -> SyncResult<()> {
        let event = self.dispatcher.attach_document(comment_id, document).await?;
        self.submit(event).await
    }

    /// Download an attached document's bytes
    pub async fn download_attachment(&self, document_id: DocumentId) -> SyncResult<Vec<u8>> {
        self.dispatcher.download_attachment(document_id).await
    }

    /// Feed a confirmed mutation through the serialized apply path
    async fn submit(&self, event: CommentEvent) -> SyncResult<()> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| SyncError::internal(anyhow::anyhow!("apply loop is not running")))
    }
}

impl Drop for ThreadSyncSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ThreadSyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadSyncSession")
            .field("ticket_id", &self.ticket_id)
            .field("started", &self.started.load(Ordering::SeqCst))
            .field("live", &self.is_live())
            .finish()
    }
}
