//! Forest walks over nested replies.
//!
//! Every walk keeps its own stack, so thread depth never grows the call stack.
//! A node is addressed by its index path: `[3, 0, 2]` is the third reply of the
//! first reply of the fourth top-level comment.

use hashbrown::HashSet;

use crate::{comment::Comment, types::CommentId};

/// Index path from the forest root to a node.
pub type TreePath = Vec<usize>;

/// Finds the index path of the comment with `id`, depth-first in display order.
pub fn locate(forest: &[Comment], id: &str) -> Option<TreePath> {
    let mut stack: Vec<(&[Comment], usize)> = vec![(forest, 0)];

    while let Some(top) = stack.last_mut() {
        let (level, idx) = *top;
        if idx >= level.len() {
            stack.pop();
            continue;
        }
        top.1 += 1;

        let node = &level[idx];
        if node.id == id {
            // Each frame has already stepped past the node it descended through.
            return Some(stack.iter().map(|(_, next)| next - 1).collect());
        }
        if !node.replies.is_empty() {
            stack.push((&node.replies, 0));
        }
    }

    None
}

/// Resolves a path produced by [`locate`].
pub fn get_at<'a>(forest: &'a [Comment], path: &[usize]) -> Option<&'a Comment> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get(*first)?;
    for &idx in rest {
        node = node.replies.get(idx)?;
    }
    Some(node)
}

/// Mutable counterpart of [`get_at`].
pub fn get_at_mut<'a>(forest: &'a mut [Comment], path: &[usize]) -> Option<&'a mut Comment> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for &idx in rest {
        node = node.replies.get_mut(idx)?;
    }
    Some(node)
}

/// Returns the comment with `id` anywhere in the forest.
pub fn find<'a>(forest: &'a [Comment], id: &str) -> Option<&'a Comment> {
    let path = locate(forest, id)?;
    get_at(forest, &path)
}

/// Returns the comment with `id` anywhere in the forest, mutably.
pub fn find_mut<'a>(forest: &'a mut [Comment], id: &str) -> Option<&'a mut Comment> {
    let path = locate(forest, id)?;
    get_at_mut(forest, &path)
}

/// Appends `reply` to the replies of `parent_id`.
///
/// When no such parent exists the forest is left as it was and the reply is
/// handed back.
pub fn attach_reply(
    forest: &mut [Comment],
    parent_id: &str,
    reply: Comment,
) -> Result<(), Comment> {
    match find_mut(forest, parent_id) {
        Some(parent) => {
            parent.replies.push(reply);
            Ok(())
        }
        None => Err(reply),
    }
}

/// Detaches the comment with `id` together with the replies it owns.
pub fn remove(forest: &mut Vec<Comment>, id: &str) -> Option<Comment> {
    let path = locate(forest, id)?;
    let (last, parent_path) = path.split_last()?;
    if parent_path.is_empty() {
        return Some(forest.remove(*last));
    }
    let parent = get_at_mut(forest, parent_path)?;
    Some(parent.replies.remove(*last))
}

/// Counts every comment in the forest, replies included.
pub fn count_all(forest: &[Comment]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Comment> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.replies.iter());
    }
    count
}

/// Ids of every comment in the forest, in depth-first display order.
pub fn all_ids(forest: &[Comment]) -> Vec<CommentId> {
    let mut out = Vec::new();
    let mut stack: Vec<&Comment> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.id.clone());
        stack.extend(node.replies.iter().rev());
    }
    out
}

/// Flattens the forest into standalone records, parents first.
///
/// Each record keeps its `parent` link and drops its `replies`; this is the
/// shape bulk backup and restore exchange.
pub fn flatten(forest: &[Comment]) -> Vec<Comment> {
    let mut out = Vec::new();
    let mut stack: Vec<(&Comment, Option<&str>)> =
        forest.iter().rev().map(|c| (c, c.parent.as_deref())).collect();

    while let Some((node, parent)) = stack.pop() {
        let mut rec = node.clone();
        rec.replies = Vec::new();
        rec.parent = parent.map(str::to_string);
        out.push(rec);
        stack.extend(
            node.replies
                .iter()
                .rev()
                .map(|child| (child, Some(node.id.as_str()))),
        );
    }

    out
}

/// Builds a forest from records that may be flat, nested, or a mix.
///
/// Records whose `parent` is present in the input are moved under it, keeping
/// input order among siblings. Records whose parent never shows up stay at the
/// top level. Ids already placed are not placed twice.
pub fn assemble(records: Vec<Comment>) -> Vec<Comment> {
    let mut seen: HashSet<CommentId> = HashSet::new();
    let mut forest: Vec<Comment> = Vec::new();
    let mut pending: Vec<Comment> = Vec::new();

    for rec in records {
        if !mark_subtree(&mut seen, &rec) {
            tracing::debug!(id = %rec.id, "dropping duplicate comment");
            continue;
        }
        match rec.parent {
            Some(_) => pending.push(rec),
            None => forest.push(rec),
        }
    }

    loop {
        let before = pending.len();
        let mut waiting = Vec::with_capacity(before);
        for rec in pending {
            let parent = rec.parent.clone().unwrap_or_default();
            if let Err(rec) = attach_reply(&mut forest, &parent, rec) {
                waiting.push(rec);
            }
        }
        pending = waiting;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    for orphan in pending {
        tracing::debug!(id = %orphan.id, parent = ?orphan.parent, "parent missing; keeping at top level");
        forest.push(orphan);
    }

    forest
}

fn mark_subtree(seen: &mut HashSet<CommentId>, root: &Comment) -> bool {
    if seen.contains(&root.id) {
        return false;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        seen.insert(node.id.clone());
        stack.extend(node.replies.iter());
    }
    true
}
