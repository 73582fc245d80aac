//! Display rows: the sorted forest flattened with its view state applied.

use chrono::{DateTime, Utc};

use crate::{
    comment::Comment,
    core::{store::CommentStore, tree},
    types::{CommentId, VoteValue},
};

/// One rendered line of the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    /// Comment id.
    pub id: CommentId,
    /// Author display name.
    pub author: String,
    /// Message body.
    pub text: String,
    /// Attachment URL when present.
    pub image: Option<String>,
    /// Nesting level, 0 for top-level comments.
    pub depth: usize,
    /// `likes` plus the local vote.
    pub score: i64,
    /// Local vote overlay.
    pub vote: VoteValue,
    /// Relative creation time, e.g. `"5m ago"`.
    pub age: String,
    /// Children are hidden.
    pub collapsed: bool,
    /// Number of comments hidden under a collapsed row.
    pub hidden: usize,
    /// Row is the edit target.
    pub editing: bool,
    /// Row is the reply target.
    pub replying: bool,
    /// Row is bookmarked.
    pub saved: bool,
}

/// Flattens the store for display at time `now`.
///
/// Top-level comments follow the store's sort mode; replies keep stored order.
/// A collapsed comment still yields its own row but none for its descendants.
pub fn rows(store: &CommentStore, now: DateTime<Utc>) -> Vec<CommentRow> {
    let mut out = Vec::new();
    let mut stack: Vec<(&Comment, usize)> =
        store.sorted().into_iter().rev().map(|c| (c, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let collapsed = store.is_collapsed(&node.id);
        let vote = store.vote_of(&node.id);
        out.push(CommentRow {
            id: node.id.clone(),
            author: node.author.clone(),
            text: node.text.clone(),
            image: node.image_url().map(str::to_string),
            depth,
            score: node.likes + i64::from(vote),
            vote,
            age: time_ago(node.date, now),
            collapsed,
            hidden: if collapsed {
                tree::count_all(&node.replies)
            } else {
                0
            },
            editing: store.editing() == Some(node.id.as_str()),
            replying: store.replying_to() == Some(node.id.as_str()),
            saved: store.is_saved(&node.id),
        });
        if !collapsed {
            stack.extend(node.replies.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    out
}

/// Short relative age: `just now`, `12m ago`, `3h ago`, `4d ago`, `2mo ago`, `1y ago`.
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{days}d ago");
    }
    let months = days / 30;
    if months < 12 {
        return format!("{months}mo ago");
    }
    format!("{}y ago", months / 12)
}
