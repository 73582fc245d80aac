use async_trait::async_trait;

use crate::comment::Comment;

use super::{CommentApi, RemoteError, RemoteResult};

/// A backend that is never reachable.
///
/// Pairing it with a controller makes every mutation take the local path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineApi;

#[async_trait]
impl CommentApi for OfflineApi {
    async fn list(&self) -> RemoteResult<Vec<Comment>> {
        Err(RemoteError::Unavailable("offline".to_string()))
    }
}
