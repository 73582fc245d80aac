//! Comment record, request payloads, and bulk snapshot shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::CommentId;

/// One user-authored message and its nested replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Stable identifier.
    #[serde(deserialize_with = "id_from_any")]
    pub id: CommentId,
    /// Display name of the author.
    pub author: String,
    /// Message body.
    pub text: String,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    /// Base score set by the backend.
    #[serde(default)]
    pub likes: i64,
    /// Attachment URL; empty when absent.
    #[serde(default)]
    pub image: String,
    /// Comment this one replies to, `None` for top-level comments.
    #[serde(
        default,
        alias = "parent_id",
        deserialize_with = "opt_id_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<CommentId>,
    /// Direct replies in display order.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Attachment URL when one is set.
    pub fn image_url(&self) -> Option<&str> {
        (!self.image.is_empty()).then_some(self.image.as_str())
    }

    /// True for comments without a parent.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Creation time in milliseconds since the epoch.
    pub fn ts_ms(&self) -> i64 {
        self.date.timestamp_millis()
    }

    /// Copies every record field from `other` except `id` and `replies`.
    pub fn absorb_record(&mut self, other: Comment) {
        self.author = other.author;
        self.text = other.text;
        self.date = other.date;
        self.likes = other.likes;
        self.image = other.image;
        self.parent = other.parent;
    }
}

/// Create payload: `{text}` or `{text, parent}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    /// Message body.
    pub text: String,
    /// Parent id for replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
}

/// Edit payload, `{text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPatch {
    /// Replacement body.
    pub text: String,
}

/// `{comments: [...]}` wrapper used by the static snapshot and list responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentsEnvelope {
    /// Wrapped comments.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// List responses come either bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentList {
    /// Bare array.
    Bare(Vec<Comment>),
    /// `{comments: [...]}`.
    Wrapped(CommentsEnvelope),
}

impl CommentList {
    /// Unwraps into the contained comments.
    pub fn into_comments(self) -> Vec<Comment> {
        match self {
            Self::Bare(comments) => comments,
            Self::Wrapped(env) => env.comments,
        }
    }
}

/// One row of a bulk-delete backup, in the backend's flat table shape.
///
/// Unlike [`Comment`] the parent link travels as `parent_id` and ids keep the
/// JSON type the backend uses, so a backup can be posted back to the restore
/// endpoint as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Row id.
    pub id: RecordId,
    /// Display name of the author.
    pub author: String,
    /// Message body.
    pub text: String,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    /// Base score.
    #[serde(default)]
    pub likes: i64,
    /// Attachment URL; empty when absent.
    #[serde(default)]
    pub image: String,
    /// Parent row, `null` for top-level comments.
    #[serde(default)]
    pub parent_id: Option<RecordId>,
}

impl From<Comment> for BackupRecord {
    fn from(c: Comment) -> Self {
        Self {
            id: RecordId::from_id(&c.id),
            author: c.author,
            text: c.text,
            date: c.date,
            likes: c.likes,
            image: c.image,
            parent_id: c.parent.as_deref().map(RecordId::from_id),
        }
    }
}

impl From<BackupRecord> for Comment {
    fn from(r: BackupRecord) -> Self {
        Self {
            id: r.id.into(),
            author: r.author,
            text: r.text,
            date: r.date,
            likes: r.likes,
            image: r.image,
            parent: r.parent_id.map(CommentId::from),
            replies: Vec::new(),
        }
    }
}

/// Answer to a bulk delete: the count plus a flat backup for undo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkDeleteReceipt {
    /// Number of deleted comments.
    #[serde(default)]
    pub deleted: usize,
    /// Flat backup rows.
    #[serde(default)]
    pub comments: Vec<BackupRecord>,
}

/// Restore body, `{comments: [...]}` of backup rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestoreRequest {
    /// Rows to re-create.
    pub comments: Vec<BackupRecord>,
}

/// Answer to a bulk restore.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestoreReceipt {
    /// Number of restored comments.
    #[serde(default)]
    pub restored: usize,
}

/// Id as it appears on the wire: integer primary keys or opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric key.
    Int(i64),
    /// Any other id.
    Text(String),
}

impl RecordId {
    /// Numeric when `id` is the canonical form of an integer, text otherwise.
    pub fn from_id(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) if n.to_string() == id => Self::Int(n),
            _ => Self::Text(id.to_string()),
        }
    }
}

impl From<RecordId> for CommentId {
    fn from(raw: RecordId) -> Self {
        match raw {
            RecordId::Int(n) => n.to_string(),
            RecordId::Text(s) => s,
        }
    }
}

fn id_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<CommentId, D::Error> {
    RecordId::deserialize(de).map(CommentId::from)
}

fn opt_id_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<Option<CommentId>, D::Error> {
    Ok(Option::<RecordId>::deserialize(de)?.map(CommentId::from))
}
