//! Reconciled-state events

use crate::jobs::models::JobStatus;
use crate::social::models::{CommentId, LikeState, Subject};
use serde::Serialize;
use uuid::Uuid;

/// A change to reconciled state, emitted after the store or the job engine
/// has finished updating its snapshot.
///
/// Observers never see raw in-flight requests: every event describes state
/// that is already visible through the store's read accessors. Must be
/// `Clone` for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    CommentsLoaded {
        post_id: Uuid,
        count: usize,
    },
    CommentsLoadFailed {
        post_id: Uuid,
        message: String,
    },
    /// A pending comment was inserted at the head of the list
    CommentAdded {
        post_id: Uuid,
        id: CommentId,
    },
    CommentConfirmed {
        post_id: Uuid,
        temp_id: CommentId,
        id: CommentId,
    },
    /// A pending comment was removed because its insert failed
    CommentRolledBack {
        post_id: Uuid,
        temp_id: CommentId,
    },
    CommentRemoved {
        post_id: Uuid,
        id: CommentId,
    },
    /// A removed comment was put back because its delete failed
    CommentRestored {
        post_id: Uuid,
        id: CommentId,
    },
    LikeChanged {
        subject: Subject,
        state: LikeState,
    },
    LikeRolledBack {
        subject: Subject,
        state: LikeState,
    },
    JobUpdated {
        job_id: String,
        status: JobStatus,
    },
}

impl SyncEvent {
    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommentsLoaded { .. } => "comments_loaded",
            Self::CommentsLoadFailed { .. } => "comments_load_failed",
            Self::CommentAdded { .. } => "comment_added",
            Self::CommentConfirmed { .. } => "comment_confirmed",
            Self::CommentRolledBack { .. } => "comment_rolled_back",
            Self::CommentRemoved { .. } => "comment_removed",
            Self::CommentRestored { .. } => "comment_restored",
            Self::LikeChanged { .. } => "like_changed",
            Self::LikeRolledBack { .. } => "like_rolled_back",
            Self::JobUpdated { .. } => "job_updated",
        }
    }
}

/// Sink for `SyncEvent`s.
///
/// Injected as `Arc<dyn EventEmitter>` into the store and the job engine.
/// Emitting is fire-and-forget: it never blocks and never fails.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: SyncEvent);
}
