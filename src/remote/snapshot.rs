use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    comment::{Comment, CommentList},
    config::ClientConfig,
};

use super::{CommentApi, RemoteError, RemoteResult};

/// Snapshot compiled into the crate, used when no fallback path is configured.
pub const BUNDLED_SNAPSHOT: &str = include_str!("../../assets/comments.json");

#[derive(Debug, Clone)]
enum Source {
    Inline(String),
    File(PathBuf),
}

/// Read-only comment source over a `{comments: [...]}` document.
///
/// Used as the load fallback when the live API is unreachable. Only
/// [`CommentApi::list`] is served; mutations report
/// [`RemoteError::Unavailable`].
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    source: Source,
}

impl StaticSnapshot {
    /// The document shipped in `assets/comments.json`.
    pub fn bundled() -> Self {
        Self::from_json(BUNDLED_SNAPSHOT)
    }

    /// An in-memory document.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            source: Source::Inline(json.into()),
        }
    }

    /// A document read from disk on every load.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// The configured fallback file, or the bundled document.
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.fallback_path {
            Some(path) => Self::from_path(path.clone()),
            None => Self::bundled(),
        }
    }

    async fn read(&self) -> RemoteResult<String> {
        match &self.source {
            Source::Inline(json) => Ok(json.clone()),
            Source::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || std::fs::read_to_string(path))
                    .await
                    .map_err(|e| RemoteError::Unavailable(format!("join error: {e}")))?
                    .map_err(RemoteError::from)
            }
        }
    }
}

#[async_trait]
impl CommentApi for StaticSnapshot {
    async fn list(&self) -> RemoteResult<Vec<Comment>> {
        let json = self.read().await?;
        let list: CommentList = serde_json::from_str(&json)?;
        Ok(list.into_comments())
    }
}
