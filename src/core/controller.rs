//! Backend-aware comment operations.
//!
//! Each mutation asks the remote first and, when that fails, applies the same
//! change locally. Only the initial load, the bulk delete and the restore
//! surface errors to the caller.

use tokio::time::Instant;

use crate::{
    comment::{CommentPatch, NewComment, RestoreRequest},
    config::ClientConfig,
    core::store::{CommentStore, StoreError},
    remote::{CommentApi, http::HttpCommentApi, snapshot::StaticSnapshot},
    types::{CommentId, LoadSource, SyncSource},
};

/// Outcome of [`CommentController::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    /// Id of the new comment.
    pub id: CommentId,
    /// Whether the backend or the local fallback produced it.
    pub source: SyncSource,
    /// False when a local-only reply had no parent to go under.
    pub placed: bool,
}

/// Outcome of an edit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// Whether the backend accepted the call.
    pub source: SyncSource,
    /// False when the target id was not in the forest.
    pub changed: bool,
}

/// Owns the store and the sources it syncs with.
pub struct CommentController {
    store: CommentStore,
    api: Box<dyn CommentApi>,
    fallback: Box<dyn CommentApi>,
    config: ClientConfig,
}

impl CommentController {
    /// Builds a controller around an empty store.
    pub fn new(
        api: Box<dyn CommentApi>,
        fallback: Box<dyn CommentApi>,
        config: ClientConfig,
    ) -> Self {
        Self {
            store: CommentStore::new(),
            api,
            fallback,
            config,
        }
    }

    /// HTTP backend plus the configured static snapshot.
    pub fn from_config(config: ClientConfig) -> Result<Self, StoreError> {
        let api = HttpCommentApi::from_config(&config)?;
        let fallback = StaticSnapshot::from_config(&config);
        Ok(Self::new(Box::new(api), Box::new(fallback), config))
    }

    /// Replaces the store, e.g. to start from seeded comments.
    pub fn with_store(mut self, store: CommentStore) -> Self {
        self.store = store;
        self
    }

    /// Read access to the current state.
    pub fn store(&self) -> &CommentStore {
        &self.store
    }

    /// Local-only state changes (votes, collapse, cursors, sort mode).
    pub fn store_mut(&mut self) -> &mut CommentStore {
        &mut self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replaces the forest from the live API, or from the snapshot when the
    /// live API fails.
    ///
    /// When both fail the list is emptied, the visible error is set and
    /// [`StoreError::LoadFailed`] is returned. The loading flag is cleared on
    /// every path.
    pub async fn load(&mut self) -> Result<LoadSource, StoreError> {
        self.store.begin_load();

        let live_err = match self.api.list().await {
            Ok(comments) => {
                tracing::debug!(count = comments.len(), "loaded live comments");
                self.store.finish_load(comments);
                return Ok(LoadSource::Live);
            }
            Err(err) => err,
        };
        tracing::warn!(error = %live_err, "live comments unavailable, using snapshot");

        match self.fallback.list().await {
            Ok(comments) => {
                self.store.finish_load(comments);
                Ok(LoadSource::Fallback)
            }
            Err(err) => {
                tracing::error!(error = %err, "snapshot unavailable");
                self.store.fail_load();
                Err(StoreError::LoadFailed)
            }
        }
    }

    /// Posts a comment, or a reply when `parent` is set.
    ///
    /// A failed post inserts a local comment where the backend's answer would
    /// have gone: first in the list, or last among the parent's replies. A
    /// reply the backend accepted for a parent that is not loaded here is
    /// shown first in the list; a local reply to a missing parent is dropped.
    pub async fn add(&mut self, text: &str, parent: Option<&str>) -> Result<Added, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }

        let new = NewComment {
            text: text.to_string(),
            parent: parent.map(str::to_string),
        };
        let (mut comment, source) = match self.api.create(&new).await {
            Ok(created) => (created, SyncSource::Remote),
            Err(err) => {
                tracing::warn!(error = %err, "create failed, keeping comment locally");
                let local = self
                    .store
                    .local_comment(&self.config.author, text, new.parent.clone());
                (local, SyncSource::LocalFallback)
            }
        };
        if comment.parent.is_none() {
            comment.parent = new.parent;
        }

        let id = comment.id.clone();
        let placed = match (self.store.try_insert(comment), source) {
            (Ok(()), _) => true,
            (Err(orphan), SyncSource::Remote) => {
                tracing::debug!(%id, parent = ?orphan.parent, "parent not loaded, showing reply at top level");
                self.store.adopt(orphan);
                true
            }
            (Err(orphan), SyncSource::LocalFallback) => {
                tracing::warn!(%id, parent = ?orphan.parent, "reply target not found");
                false
            }
        };
        Ok(Added { id, source, placed })
    }

    /// Replies to the comment under the reply cursor and clears the cursor.
    pub async fn reply(&mut self, text: &str) -> Result<Added, StoreError> {
        let parent = self
            .store
            .replying_to()
            .map(str::to_string)
            .ok_or(StoreError::NoReplyTarget)?;
        let added = self.add(text, Some(&parent)).await?;
        self.store.cancel_reply();
        Ok(added)
    }

    /// Replaces the text of `id` and clears the edit cursor.
    ///
    /// An unknown id leaves the forest untouched.
    pub async fn update(&mut self, id: &str, text: &str) -> Result<Mutation, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }

        let patch = CommentPatch {
            text: text.to_string(),
        };
        let mutation = match self.api.update(id, &patch).await {
            Ok(updated) => Mutation {
                source: SyncSource::Remote,
                changed: self.store.replace_record(id, updated),
            },
            Err(err) => {
                tracing::warn!(%id, error = %err, "update failed, editing locally");
                Mutation {
                    source: SyncSource::LocalFallback,
                    changed: self.store.set_text(id, text),
                }
            }
        };
        self.store.cancel_edit();
        Ok(mutation)
    }

    /// Deletes `id`. The local removal happens whatever the backend says.
    pub async fn remove(&mut self, id: &str) -> Mutation {
        let source = match self.api.delete(id).await {
            Ok(()) => SyncSource::Remote,
            Err(err) => {
                tracing::warn!(%id, error = %err, "delete failed, removing locally");
                SyncSource::LocalFallback
            }
        };
        let changed = self.store.remove(id).is_some();
        Mutation { source, changed }
    }

    /// Deletes every comment once `confirm` approves the total count.
    ///
    /// On success the forest is emptied and an undo window opens for
    /// [`ClientConfig::undo_window_ms`]. Returns the number the backend
    /// reported as deleted.
    pub async fn delete_all<F>(&mut self, confirm: F) -> Result<usize, StoreError>
    where
        F: FnOnce(usize) -> bool,
    {
        let total = self.store.total_count();
        if !confirm(total) {
            return Err(StoreError::NotConfirmed);
        }

        match self.api.delete_all().await {
            Ok(receipt) => {
                let expires_at = Instant::now() + self.config.undo_window();
                self.store.clear_with_undo(receipt.comments, expires_at);
                self.store.clear_error();
                tracing::debug!(deleted = receipt.deleted, "deleted all comments");
                Ok(receipt.deleted)
            }
            Err(err) => {
                tracing::error!(error = %err, "bulk delete failed");
                self.store.set_error(format!("Failed to delete comments: {err}"));
                Err(err.into())
            }
        }
    }

    /// Restores the last bulk delete while its window is open.
    ///
    /// The backup is sent to the restore endpoint and the forest is reloaded
    /// from the live API. If that reload fails the pre-delete forest is put
    /// back locally and [`SyncSource::LocalFallback`] is returned. A failed
    /// restore keeps the window until its original deadline.
    pub async fn undo(&mut self) -> Result<SyncSource, StoreError> {
        let backup = match self.store.live_undo(Instant::now()) {
            Ok(window) => RestoreRequest {
                comments: window.backup.clone(),
            },
            Err(StoreError::UndoExpired) => {
                self.store.take_undo();
                return Err(StoreError::UndoExpired);
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = self.api.restore(&backup).await {
            tracing::error!(error = %err, "restore failed");
            self.store.set_error(format!("Failed to restore comments: {err}"));
            return Err(err.into());
        }

        let window = self.store.take_undo().ok_or(StoreError::NothingToUndo)?;
        self.store.begin_load();
        match self.api.list().await {
            Ok(comments) => {
                self.store.finish_load(comments);
                Ok(SyncSource::Remote)
            }
            Err(err) => {
                tracing::warn!(error = %err, "reload after restore failed, reinstating local copy");
                self.store.finish_load(window.forest);
                Ok(SyncSource::LocalFallback)
            }
        }
    }

    /// Drops an elapsed undo window; true when one was dropped.
    pub fn expire_undo(&mut self) -> bool {
        self.store.expire_undo(Instant::now())
    }
}
