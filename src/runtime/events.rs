//! Runtime event stream payloads.

use crate::types::{CommentId, LoadSource, SortMode, SyncSource, VoteValue};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentEvent {
    /// The forest was replaced by a load.
    Loaded {
        /// Which source answered.
        source: LoadSource,
        /// Top-level comments now shown.
        count: usize,
    },
    /// Neither the live API nor the snapshot could be loaded.
    LoadFailed,
    /// A comment or reply was added.
    Added {
        /// New comment id.
        id: CommentId,
        /// Backend or local fallback.
        source: SyncSource,
    },
    /// A comment's text changed.
    Updated {
        /// Edited comment id.
        id: CommentId,
        /// Backend or local fallback.
        source: SyncSource,
    },
    /// A comment was removed.
    Removed {
        /// Removed comment id.
        id: CommentId,
        /// Backend or local fallback.
        source: SyncSource,
    },
    /// Everything was deleted and an undo window opened.
    Cleared {
        /// Count reported by the backend.
        deleted: usize,
    },
    /// A bulk delete was undone.
    Restored {
        /// Reloaded from the backend, or reinstated locally.
        source: SyncSource,
    },
    /// The undo window closed without being used.
    UndoExpired,
    /// A vote overlay changed.
    Voted {
        /// Voted comment id.
        id: CommentId,
        /// New overlay value.
        value: VoteValue,
    },
    /// A comment was collapsed or expanded.
    CollapseToggled {
        /// Toggled comment id.
        id: CommentId,
        /// True when now collapsed.
        collapsed: bool,
    },
    /// The top-level ordering changed.
    SortChanged {
        /// New sort mode.
        mode: SortMode,
    },
}
