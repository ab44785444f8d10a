//! Paginated snapshot loader
//!
//! Fetches one page of root-level comments (with nested replies) for a
//! ticket. Pure request/response: no state, no side effects beyond the
//! network call. The server answers with either a paginated envelope or a
//! bare array depending on its version; both normalize into the same page
//! shape here.

use std::sync::Arc;

use serde::Deserialize;

use sync_common::{SyncConfig, SyncError, SyncResult};
use sync_core::{Comment, Pagination, TicketId};

use crate::protocol::CommentWire;

/// One normalized page of a thread's root comments
#[derive(Debug, Clone)]
pub struct SnapshotPage {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

/// The two body shapes the snapshot endpoint may answer with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotBody {
    Paginated {
        results: Vec<CommentWire>,
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    Flat(Vec<CommentWire>),
}

/// Snapshot loader for a comment service
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    http: reqwest::Client,
    config: Arc<SyncConfig>,
    origin: String,
}

impl SnapshotLoader {
    /// Create a loader sharing an HTTP client
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

    /// Load one page of root comments for a ticket
    pub async fn load(&self, ticket_id: TicketId, page: Option<u32>) -> SyncResult<SnapshotPage> {
        let mut url = format!("{}/comments/{}/", self.config.service.base_url, ticket_id);
        if let Some(page) = page {
            url.push_str(&format!("?page={page}"));
        }

        tracing::debug!(ticket_id = %ticket_id, page = ?page, "loading snapshot page");

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

        let body: SnapshotBody = response.json().await.map_err(SyncError::decode)?;
        Ok(normalize(body, page.unwrap_or(1), &self.origin))
    }
}

/// Collapse both body shapes into one page
fn normalize(body: SnapshotBody, current_page: u32, origin: &str) -> SnapshotPage {
    let (results, count, next, previous) = match body {
        SnapshotBody::Paginated {
            results,
            count,
            next,
            previous,
        } => (results, count, next, previous),
        SnapshotBody::Flat(results) => {
            let count = results.len() as u64;
            (results, count, None, None)
        }
    };

    SnapshotPage {
        comments: results
            .into_iter()
            .filter_map(|c| c.into_domain(origin))
            .collect(),
        pagination: Pagination::new(count, next, previous, current_page),
    }
}
