//! Comments, likes and notifications
//!
//! This module provides:
//! - `OptimisticStore` for the comment list and like memberships of one post
//! - `reconcile` with the merge and rollback rules the store applies
//! - `NotificationFeed` for the viewer's inbox

pub mod models;
pub mod notifications;
pub mod reconcile;
pub mod store;

pub use models::{
    Author, Comment, CommentId, LikeKey, LikeState, Notification, Subject, SubjectKind, Viewer,
};
pub use notifications::NotificationFeed;
pub use store::{LoadState, OptimisticStore, StoreConfig, DEFAULT_MAX_COMMENT_LENGTH};
