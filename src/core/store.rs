use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use tokio::time::Instant;

use crate::{
    comment::{BackupRecord, Comment},
    core::tree,
    engine::sort,
    remote::RemoteError,
    types::{CommentId, SortMode, VoteDirection, VoteValue},
};

/// Visible message shown when neither the live API nor the snapshot loads.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load comments. Make sure the backend is running.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("comment text is empty")]
    EmptyText,
    #[error("bulk delete was not confirmed")]
    NotConfirmed,
    #[error("no comment is selected for reply")]
    NoReplyTarget,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("undo window has expired")]
    UndoExpired,
    #[error("no comment source could be loaded")]
    LoadFailed,
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),
}

/// State captured by a bulk delete so it can be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoWindow {
    /// Flat rows sent back to the restore endpoint.
    pub backup: Vec<BackupRecord>,
    /// Forest as it was right before the delete.
    pub forest: Vec<Comment>,
    /// Instant after which the window is gone.
    pub expires_at: Instant,
}

/// In-memory comment forest and its view state.
///
/// Every mutation here is local; the controller decides when to call them
/// based on what the backend answered.
#[derive(Debug, Default)]
pub struct CommentStore {
    forest: Vec<Comment>,
    votes: HashMap<CommentId, VoteValue>,
    collapsed: HashSet<CommentId>,
    saved: HashSet<CommentId>,
    editing: Option<CommentId>,
    replying_to: Option<CommentId>,
    sort_mode: SortMode,
    loading: bool,
    error: Option<String>,
    undo: Option<UndoWindow>,
    last_local_id: u64,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comments(comments: Vec<Comment>) -> Self {
        Self {
            forest: tree::assemble(comments),
            ..Self::default()
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.forest
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        tree::find(&self.forest, id)
    }

    pub fn get_cloned(&self, id: &str) -> Option<Comment> {
        self.get(id).cloned()
    }

    /// Number of top-level comments.
    pub fn comment_count(&self) -> usize {
        self.forest.len()
    }

    /// Number of comments including every nested reply.
    pub fn total_count(&self) -> usize {
        tree::count_all(&self.forest)
    }

    pub fn sorted(&self) -> Vec<&Comment> {
        sort::sorted(&self.forest, self.sort_mode)
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn replying_to(&self) -> Option<&str> {
        self.replying_to.as_deref()
    }

    pub fn vote_of(&self, id: &str) -> VoteValue {
        self.votes.get(id).copied().unwrap_or(0)
    }

    /// `likes` plus the local vote overlay.
    pub fn effective_score(&self, id: &str) -> Option<i64> {
        self.get(id)
            .map(|c| c.likes + i64::from(self.vote_of(id)))
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.contains(id)
    }

    pub fn undo_window(&self) -> Option<&UndoWindow> {
        self.undo.as_ref()
    }

    pub fn undo_deadline(&self) -> Option<Instant> {
        self.undo.as_ref().map(|w| w.expires_at)
    }

    /// Sets the vote for `id`; repeating the active direction clears it.
    pub fn vote(&mut self, id: &str, direction: VoteDirection) -> VoteValue {
        let current = self.vote_of(id);
        let next = if current == direction.value() {
            0
        } else {
            direction.value()
        };
        self.votes.insert(id.to_string(), next);
        next
    }

    /// Flips collapse state; returns true when `id` is now collapsed.
    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        toggle(&mut self.collapsed, id)
    }

    /// Flips saved state; returns true when `id` is now saved.
    pub fn toggle_saved(&mut self, id: &str) -> bool {
        toggle(&mut self.saved, id)
    }

    pub fn begin_edit(&mut self, id: &str) {
        self.editing = Some(id.to_string());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn begin_reply(&mut self, id: &str) {
        self.replying_to = Some(id.to_string());
    }

    pub fn cancel_reply(&mut self) {
        self.replying_to = None;
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Installs a freshly loaded forest and clears any visible error.
    pub fn finish_load(&mut self, comments: Vec<Comment>) {
        self.forest = tree::assemble(comments);
        self.error = None;
        self.loading = false;
    }

    /// Leaves the list empty and shows the load failure.
    pub fn fail_load(&mut self) {
        self.forest.clear();
        self.error = Some(LOAD_FAILED_MESSAGE.to_string());
        self.loading = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Builds a comment that exists only locally.
    pub fn local_comment(
        &mut self,
        author: &str,
        text: &str,
        parent: Option<CommentId>,
    ) -> Comment {
        let now = Utc::now();
        Comment {
            id: self.next_local_id(now).to_string(),
            author: author.to_string(),
            text: text.to_string(),
            date: now,
            likes: 0,
            image: String::new(),
            parent,
            replies: Vec::new(),
        }
    }

    /// Places a new comment: at the head of the list, or under its parent.
    ///
    /// Returns false when the parent is not in the forest; nothing changes then.
    pub fn insert(&mut self, comment: Comment) -> bool {
        match self.try_insert(comment) {
            Ok(()) => true,
            Err(orphan) => {
                tracing::warn!(id = %orphan.id, parent = ?orphan.parent, "reply target not found");
                false
            }
        }
    }

    /// Like [`CommentStore::insert`] but hands the comment back when its
    /// parent is missing.
    pub fn try_insert(&mut self, comment: Comment) -> Result<(), Comment> {
        match comment.parent.clone() {
            None => {
                self.forest.insert(0, comment);
                Ok(())
            }
            Some(parent) => tree::attach_reply(&mut self.forest, &parent, comment),
        }
    }

    /// Shows a reply whose parent is not loaded at the head of the list,
    /// keeping its `parent` link.
    pub fn adopt(&mut self, orphan: Comment) {
        self.forest.insert(0, orphan);
    }

    /// Replaces the text of `id`; false when no such comment exists.
    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        match tree::find_mut(&mut self.forest, id) {
            Some(c) => {
                c.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Mirrors a backend answer into `id`, keeping local replies.
    pub fn replace_record(&mut self, id: &str, updated: Comment) -> bool {
        match tree::find_mut(&mut self.forest, id) {
            Some(c) => {
                c.absorb_record(updated);
                true
            }
            None => false,
        }
    }

    /// Removes the exact node `id` and forgets its view state.
    pub fn remove(&mut self, id: &str) -> Option<Comment> {
        let removed = tree::remove(&mut self.forest, id)?;
        for gone in tree::all_ids(std::slice::from_ref(&removed)) {
            self.forget(&gone);
        }
        Some(removed)
    }

    /// Empties the forest and arms an undo window holding what was removed.
    ///
    /// Votes, collapse and saved marks are kept so they apply again once the
    /// same ids are restored.
    pub fn clear_with_undo(&mut self, backup: Vec<BackupRecord>, expires_at: Instant) {
        let forest = std::mem::take(&mut self.forest);
        let backup = if backup.is_empty() {
            tree::flatten(&forest)
                .into_iter()
                .map(BackupRecord::from)
                .collect()
        } else {
            backup
        };
        self.editing = None;
        self.replying_to = None;
        self.undo = Some(UndoWindow {
            backup,
            forest,
            expires_at,
        });
    }

    /// The armed undo window, if it is still open at `now`.
    pub fn live_undo(&self, now: Instant) -> Result<&UndoWindow, StoreError> {
        match &self.undo {
            None => Err(StoreError::NothingToUndo),
            Some(w) if now >= w.expires_at => Err(StoreError::UndoExpired),
            Some(w) => Ok(w),
        }
    }

    /// Discards the undo window and hands it back.
    pub fn take_undo(&mut self) -> Option<UndoWindow> {
        self.undo.take()
    }

    /// Discards the undo window if it has elapsed at `now`.
    pub fn expire_undo(&mut self, now: Instant) -> bool {
        if self.undo.as_ref().is_some_and(|w| now >= w.expires_at) {
            self.undo = None;
            return true;
        }
        false
    }

    fn forget(&mut self, id: &str) {
        self.votes.remove(id);
        self.collapsed.remove(id);
        self.saved.remove(id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        if self.replying_to.as_deref() == Some(id) {
            self.replying_to = None;
        }
    }

    fn next_local_id(&mut self, now: DateTime<Utc>) -> u64 {
        let clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = clock.max(self.last_local_id.saturating_add(1));
        self.last_local_id = id;
        id
    }
}

fn toggle(set: &mut HashSet<CommentId>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}
