//! Mutation dispatcher
//!
//! Issues the viewer's writes to the comment service. Every successful write
//! maps the server's response into a `CommentEvent` so the caller can feed it
//! through the same apply path as remote events; the stream's echo of the
//! same mutation is then absorbed by the engine's idempotence. Failures are
//! surfaced as `SyncError` with the tree untouched; there is no automatic
//! retry.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use validator::Validate;

use sync_common::{SyncConfig, SyncError, SyncResult};
use sync_core::{CommentAction, CommentEvent, CommentId, DocumentId, UserId};

use crate::protocol::CommentWire;

use super::requests::{DocumentUpload, NewComment, RatingUpdate};

/// Dispatcher for the viewer's own writes
#[derive(Debug, Clone)]
pub struct MutationDispatcher {
    http: reqwest::Client,
    config: Arc<SyncConfig>,
    origin: String,
}

impl MutationDispatcher {
    /// Create a dispatcher sharing an HTTP client
    pub fn new(http: reqwest::Client, config: Arc<SyncConfig>) -> SyncResult<Self> {
        let origin = config
            .service
            .origin()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        Ok(Self {
            http,
            config,
            origin,
        })
    }

    /// Post a new root comment
    pub async fn create_comment(&self, new: &NewComment) -> SyncResult<CommentEvent> {
        new.validate().map_err(SyncError::validation)?;

        let url = format!("{}/comments/", self.config.service.base_url);
        let wire = self.post_json(&url, new).await?;
        self.confirm(CommentAction::Create, wire)
    }

    /// Post a reply to an existing root comment
    pub async fn add_reply(&self, new: &NewComment) -> SyncResult<CommentEvent> {
        if new.parent.is_none() {
            return Err(SyncError::validation("a reply requires a parent comment"));
        }
        new.validate().map_err(SyncError::validation)?;

        let url = format!("{}/comments/", self.config.service.base_url);
        let wire = self.post_json(&url, new).await?;
        self.confirm(CommentAction::Reply, wire)
    }

    /// Post a new comment with attached documents (multipart body)
    pub async fn create_comment_with_documents(
        &self,
        new: &NewComment,
        documents: Vec<DocumentUpload>,
    ) -> SyncResult<CommentEvent> {
        new.validate().map_err(SyncError::validation)?;

        let mut form = Form::new()
            .text("content", new.content.clone())
            .text("ticket_id", new.ticket_id.to_string())
            .text("user_id", new.user_id.to_string());
        if let Some(parent) = new.parent {
            form = form.text("parent", parent.to_string());
        }
        for document in documents {
            form = form.part("documents", part_for(document)?);
        }

        let url = format!("{}/comments/", self.config.service.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(SyncError::transport)?;
        let wire = decode_comment(response).await?;

        let action = if new.parent.is_some() {
            CommentAction::Reply
        } else {
            CommentAction::Create
        };
        self.confirm(action, wire)
    }

    /// Set the viewer's reaction on a comment
    pub async fn set_reaction(
        &self,
        comment_id: CommentId,
        user_id: UserId,
        symbol: impl Into<String>,
    ) -> SyncResult<CommentEvent> {
        self.rate(comment_id, &RatingUpdate::set(user_id, symbol)).await
    }

    /// Clear the viewer's reaction on a comment
    pub async fn clear_reaction(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> SyncResult<CommentEvent> {
        self.rate(comment_id, &RatingUpdate::clear(user_id)).await
    }

    async fn rate(&self, comment_id: CommentId, update: &RatingUpdate) -> SyncResult<CommentEvent> {
        let url = format!("{}/comments/{}/rate/", self.config.service.base_url, comment_id);
        let wire = self.post_json(&url, update).await?;
        self.confirm(CommentAction::Rate, wire)
    }

    /// Delete a comment or reply
    pub async fn delete_comment(&self, comment_id: CommentId) -> SyncResult<CommentEvent> {
        let url = format!("{}/comments/{}/", self.config.service.base_url, comment_id);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(SyncError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::http(status.as_u16(), body));
        }

        tracing::info!(comment_id = %comment_id, "comment deleted");
        Ok(CommentEvent::deletion(comment_id))
    }

    /// Attach a document to an existing comment (multipart body)
    pub async fn attach_document(
        &self,
        comment_id: CommentId,
        document: DocumentUpload,
    ) -> SyncResult<CommentEvent> {
        let url = format!(
            "{}/comments/{}/attach_document/",
            self.config.service.base_url, comment_id
        );
        let form = Form::new().part("document", part_for(document)?);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(SyncError::transport)?;
        let wire = decode_comment(response).await?;
        self.confirm(CommentAction::AttachDocument, wire)
    }

    /// Download an attached document's bytes
    pub async fn download_attachment(&self, document_id: DocumentId) -> SyncResult<Vec<u8>> {
        let url = format!(
            "{}/comments/download-document/{}/",
            self.config.service.base_url, document_id
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(SyncError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::http(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(SyncError::transport)?;
        Ok(bytes.to_vec())
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> SyncResult<CommentWire> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(SyncError::transport)?;
        decode_comment(response).await
    }

    /// Normalize a confirmed payload into an event for the apply path
    fn confirm(&self, action: CommentAction, wire: CommentWire) -> SyncResult<CommentEvent> {
        let comment = wire
            .into_domain(&self.origin)
            .ok_or_else(|| SyncError::decode("confirmed comment carries no id"))?;

        tracing::debug!(
            comment_id = %comment.id,
            action = %action,
            "write confirmed"
        );

        Ok(CommentEvent::new(action, comment))
    }
}

async fn decode_comment(response: reqwest::Response) -> SyncResult<CommentWire> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::http(status.as_u16(), body));
    }
    response.json().await.map_err(SyncError::decode)
}

fn part_for(document: DocumentUpload) -> SyncResult<Part> {
    Part::bytes(document.bytes)
        .file_name(document.filename)
        .mime_str(&document.content_type)
        .map_err(|e| SyncError::validation(format!("invalid content type: {e}")))
}
