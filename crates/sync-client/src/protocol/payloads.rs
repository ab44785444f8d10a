//! Wire payloads and their normalization into domain types
//!
//! The backend has shipped several payload shapes over time: comment ids
//! under `id` or the legacy `pk`, document metadata either inline or nested
//! one level down under `document`, and download URLs that may be relative
//! to the service origin. Everything is normalized here, once, at ingestion;
//! the engine and entities never see the loose shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sync_core::{Attachment, Author, Comment, CommentId, DocumentId, Reaction, UserId};

/// Comment author as carried on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthorWire {
    fn into_domain(self) -> Author {
        Author {
            id: UserId::new(self.id.unwrap_or_default()),
            full_name: self.full_name.unwrap_or_default(),
            role: self.role,
        }
    }
}

/// One reaction entry as carried on the wire
///
/// The user may arrive as a nested object or as a bare `user_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingWire {
    #[serde(default)]
    pub user: Option<AuthorWire>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub rating: String,
}

impl RatingWire {
    /// The stable user id this reaction belongs to, if the payload carries one
    ///
    /// Entries without an id are dropped: reactions are matched by id only,
    /// never by display name.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .or_else(|| self.user.as_ref().and_then(|u| u.id))
            .map(UserId::new)
    }

    fn into_domain(self) -> Option<Reaction> {
        let user_id = self.user_id()?;
        Some(Reaction::new(user_id, self.rating))
    }
}

/// Document metadata as carried on the wire
///
/// The actual metadata may live one level down under `document`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub document: Option<Box<DocumentWire>>,
    #[serde(default, alias = "filename")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default, alias = "file")]
    pub download_url: Option<String>,
}

impl DocumentWire {
    /// Collapse the nested shape to a flat one
    fn flatten(self) -> DocumentWire {
        match self.document {
            Some(inner) => *inner,
            None => self,
        }
    }

    /// Normalize into a domain attachment; `None` when no id is present
    pub fn into_domain(self, origin: &str) -> Option<Attachment> {
        let doc = self.flatten();
        let id = doc.id?;
        Some(Attachment::new(
            DocumentId::new(id),
            doc.file_name.unwrap_or_default(),
            doc.content_type.unwrap_or_default(),
            doc.size.unwrap_or_default(),
            absolutize(origin, doc.download_url.unwrap_or_default()),
        ))
    }
}

/// Prefix relative download URLs with the service origin
fn absolutize(origin: &str, url: String) -> String {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url
    } else if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}

/// Comment as carried on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentWire {
    #[serde(default)]
    pub id: Option<i64>,
    /// Legacy id field from older payload shapes
    #[serde(default)]
    pub pk: Option<i64>,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub user: Option<AuthorWire>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub documents: Vec<DocumentWire>,
    #[serde(default)]
    pub ratings: Vec<RatingWire>,
    #[serde(default)]
    pub replies: Vec<CommentWire>,
}

impl CommentWire {
    /// Canonical comment id: `id` with legacy `pk` fallback
    pub fn canonical_id(&self) -> Option<CommentId> {
        self.id.or(self.pk).map(CommentId::new)
    }

    /// Normalize into a domain comment; `None` when no id field is present
    pub fn into_domain(self, origin: &str) -> Option<Comment> {
        let id = self.canonical_id()?;

        Some(Comment {
            id,
            parent: self.parent.map(CommentId::new),
            author: self.user.unwrap_or_default().into_domain(),
            content: self.content,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            edited: self.edited,
            attachments: self
                .documents
                .into_iter()
                .filter_map(|d| d.into_domain(origin))
                .collect(),
            reactions: self
                .ratings
                .into_iter()
                .filter_map(RatingWire::into_domain)
                .collect(),
            replies: self
                .replies
                .into_iter()
                .filter_map(|r| r.into_domain(origin))
                .collect(),
        })
    }
}
