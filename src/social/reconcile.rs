//! Reconciliation rules for optimistic comment and like state
//!
//! Pure functions over the store's ordered comment list. The store calls them
//! inside its critical sections; they never touch the network.
//!
//! - a pending comment goes to the head of the list
//! - confirmation replaces the record carrying the temporary id, at its
//!   current position, by identity of that id
//! - failure removes exactly the record carrying the temporary id
//! - like rollback restores the snapshot captured when the toggle was issued

use super::models::{Comment, CommentId, LikeState, Subject};
use crate::remote::models::InsertedComment;

/// Order comments most-recent-first. Stable for equal timestamps.
pub fn order_most_recent_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Insert a pending comment at the head of the list.
pub fn insert_pending(comments: &mut Vec<Comment>, pending: Comment) {
    comments.insert(0, pending);
}

/// Replace the record carrying `temp_id` with its server-confirmed version.
///
/// If a reload already listed the server row, the temporary record is
/// dropped and the listed row is returned, so each server id appears once.
/// Returns `None` when neither record exists anymore.
pub fn confirm_pending(
    comments: &mut Vec<Comment>,
    temp_id: CommentId,
    inserted: &InsertedComment,
) -> Option<Comment> {
    let server_id = CommentId::Server(inserted.id);
    if let Some(listed) = comments.iter().find(|c| c.id == server_id).cloned() {
        comments.retain(|c| c.id != temp_id);
        return Some(listed);
    }
    let slot = comments.iter_mut().find(|c| c.id == temp_id)?;
    let confirmed = slot.confirmed(inserted.id, inserted.created_at);
    *slot = confirmed.clone();
    Some(confirmed)
}

/// Remove the record carrying `id`, returning it with the index it held.
pub fn take(comments: &mut Vec<Comment>, id: CommentId) -> Option<(usize, Comment)> {
    let index = comments.iter().position(|c| c.id == id)?;
    Some((index, comments.remove(index)))
}

/// Put a removed record back at `index` (clamped to the current length).
pub fn restore_at(comments: &mut Vec<Comment>, index: usize, comment: Comment) {
    let index = index.min(comments.len());
    comments.insert(index, comment);
}

/// Like state captured immediately before a toggle was applied.
///
/// Rolling back restores `before` verbatim rather than re-deriving from the
/// current state, so a failed toggle cannot compound with a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub subject: Subject,
    pub before: LikeState,
    pub applied: LikeState,
}

impl LikeSnapshot {
    /// Capture `before` and compute the toggled state to apply
    pub fn capture(subject: Subject, before: LikeState) -> Self {
        Self {
            subject,
            before,
            applied: before.toggled(),
        }
    }

    /// True when this toggle adds a like (insert), false for a delete
    pub fn is_like(&self) -> bool {
        self.applied.liked
    }
}
