//! Orderings for the top-level comment list.
//!
//! Sorting never touches the forest itself and never reorders replies.

use std::cmp::Ordering;

use crate::{comment::Comment, types::SortMode};

/// Score at which a comment counts as perfectly split.
pub const CONTROVERSY_PIVOT: i64 = 50;

/// Weight of likes in the `best` score.
pub const BEST_LIKES_WEIGHT: f64 = 0.7;

/// Divisor that shrinks a millisecond timestamp into a tiebreak.
pub const BEST_RECENCY_SCALE: f64 = 1e12;

/// Returns the top-level comments in display order for `mode`.
///
/// The sort is stable: comments that compare equal keep their stored order.
pub fn sorted(comments: &[Comment], mode: SortMode) -> Vec<&Comment> {
    let mut view: Vec<&Comment> = comments.iter().collect();
    view.sort_by(|a, b| compare(mode, a, b));
    view
}

/// Owned variant of [`sorted`].
pub fn sorted_cloned(comments: &[Comment], mode: SortMode) -> Vec<Comment> {
    sorted(comments, mode).into_iter().cloned().collect()
}

/// Comparator behind [`sorted`]; `Less` means `a` is shown first.
pub fn compare(mode: SortMode, a: &Comment, b: &Comment) -> Ordering {
    match mode {
        SortMode::New => b.date.cmp(&a.date),
        SortMode::Old => a.date.cmp(&b.date),
        SortMode::Top => b.likes.cmp(&a.likes),
        SortMode::Controversial => controversy(b).cmp(&controversy(a)),
        SortMode::Best => best_score(b).total_cmp(&best_score(a)),
    }
}

/// Distance of `likes` from [`CONTROVERSY_PIVOT`]; larger sorts first.
pub fn controversy(comment: &Comment) -> u64 {
    CONTROVERSY_PIVOT.abs_diff(comment.likes)
}

/// Weighted likes plus a small bonus that grows with the timestamp.
pub fn best_score(comment: &Comment) -> f64 {
    comment.likes as f64 * BEST_LIKES_WEIGHT + comment.ts_ms() as f64 / BEST_RECENCY_SCALE
}
