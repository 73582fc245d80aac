//! Remote comment API abstraction and its implementations.

use async_trait::async_trait;

use crate::comment::{
    BulkDeleteReceipt, Comment, CommentPatch, NewComment, RestoreReceipt, RestoreRequest,
};

/// JSON-over-HTTP client for the live comments API.
pub mod http;
/// Source that never answers, for purely local use.
pub mod offline;
/// Read-only source backed by a static `{comments: [...]}` document.
pub mod snapshot;

/// Failure of a single remote call.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{method} {url} returned {status}")]
    Status {
        /// Request method.
        method: &'static str,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Payload could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The configured base URL is unusable.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The source cannot serve this call.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Collection and item operations of the comments backend.
///
/// Every call either succeeds or reports a [`RemoteError`]; nothing retries.
/// Mutating calls default to [`RemoteError::Unavailable`] so read-only sources
/// only implement [`CommentApi::list`].
#[async_trait]
pub trait CommentApi: Send + Sync {
    /// Fetches the whole forest.
    async fn list(&self) -> RemoteResult<Vec<Comment>>;

    /// Creates a comment or reply and returns it as stored.
    async fn create(&self, _new: &NewComment) -> RemoteResult<Comment> {
        Err(read_only("create"))
    }

    /// Replaces the text of `id` and returns the stored record.
    async fn update(&self, _id: &str, _patch: &CommentPatch) -> RemoteResult<Comment> {
        Err(read_only("update"))
    }

    /// Deletes `id`.
    async fn delete(&self, _id: &str) -> RemoteResult<()> {
        Err(read_only("delete"))
    }

    /// Deletes everything and returns a flat backup.
    async fn delete_all(&self) -> RemoteResult<BulkDeleteReceipt> {
        Err(read_only("delete_all"))
    }

    /// Re-creates comments from a backup produced by [`CommentApi::delete_all`].
    async fn restore(&self, _backup: &RestoreRequest) -> RemoteResult<RestoreReceipt> {
        Err(read_only("restore"))
    }
}

fn read_only(call: &str) -> RemoteError {
    RemoteError::Unavailable(format!("{call} is not supported by this source"))
}
