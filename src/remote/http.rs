//! reqwest-backed implementation of [`CommentApi`].

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::{
    comment::{
        BulkDeleteReceipt, Comment, CommentList, CommentPatch, NewComment, RestoreReceipt,
        RestoreRequest,
    },
    config::ClientConfig,
};

use super::{CommentApi, RemoteError, RemoteResult};

/// Client for `{base}/comments/` and its item and bulk routes.
#[derive(Debug, Clone)]
pub struct HttpCommentApi {
    client: Client,
    base: String,
}

impl HttpCommentApi {
    /// Uses `base` (absolute, e.g. `http://host/api`) with a default client.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base)
    }

    /// Uses a caller-provided client.
    pub fn with_client(client: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    /// Resolves the base URL from `config`.
    pub fn from_config(config: &ClientConfig) -> RemoteResult<Self> {
        Ok(Self::new(config.resolved_api_base()?))
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn collection_url(&self) -> String {
        format!("{}/comments/", self.base)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/comments/{id}/", self.base)
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/comments/{action}/", self.base)
    }
}

#[async_trait]
impl CommentApi for HttpCommentApi {
    async fn list(&self) -> RemoteResult<Vec<Comment>> {
        let url = self.collection_url();
        tracing::debug!(%url, "fetching comments");
        let resp = check("GET", &url, self.client.get(&url).send().await?)?;
        Ok(resp.json::<CommentList>().await?.into_comments())
    }

    async fn create(&self, new: &NewComment) -> RemoteResult<Comment> {
        let url = self.collection_url();
        tracing::debug!(%url, parent = ?new.parent, "creating comment");
        let resp = check("POST", &url, self.client.post(&url).json(new).send().await?)?;
        Ok(resp.json().await?)
    }

    async fn update(&self, id: &str, patch: &CommentPatch) -> RemoteResult<Comment> {
        let url = self.item_url(id);
        tracing::debug!(%url, "updating comment");
        let resp = check("PATCH", &url, self.client.patch(&url).json(patch).send().await?)?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        let url = self.item_url(id);
        tracing::debug!(%url, "deleting comment");
        check("DELETE", &url, self.client.delete(&url).send().await?)?;
        Ok(())
    }

    async fn delete_all(&self) -> RemoteResult<BulkDeleteReceipt> {
        let url = self.action_url("delete_all");
        tracing::debug!(%url, "deleting all comments");
        let resp = check("DELETE", &url, self.client.delete(&url).send().await?)?;
        Ok(resp.json().await?)
    }

    async fn restore(&self, backup: &RestoreRequest) -> RemoteResult<RestoreReceipt> {
        let url = self.action_url("restore");
        tracing::debug!(%url, count = backup.comments.len(), "restoring comments");
        let resp = check("POST", &url, self.client.post(&url).json(backup).send().await?)?;
        Ok(resp.json().await?)
    }
}

fn check(method: &'static str, url: &str, resp: Response) -> RemoteResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(RemoteError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
    })
}
