//! Test helper factories
//!
//! Provides convenience functions for creating rows, viewers and stores with
//! sensible defaults.

use crate::remote::mock::MockBackend;
use crate::remote::models::{AuthorRow, CommentRow, NotificationKind, NotificationRow};
use crate::social::{OptimisticStore, Viewer};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Test data factories
// ============================================================================

/// Create a signed-in viewer with a fresh id
pub fn test_viewer() -> Viewer {
    Viewer {
        id: Uuid::new_v4(),
        display_name: "Test Viewer".to_string(),
        username: Some("test-viewer".to_string()),
        avatar: None,
    }
}

/// Create an author row with a fresh id
pub fn test_author_row(name: &str) -> AuthorRow {
    AuthorRow {
        id: Uuid::new_v4(),
        display_name: Some(name.to_string()),
        username: Some(name.to_lowercase().replace(' ', "-")),
        avatar: None,
    }
}

/// Create a top-level comment row written `minutes_ago` by a random author
pub fn test_comment_row(content: &str, minutes_ago: i64, likes: u32, is_liked: bool) -> CommentRow {
    CommentRow {
        id: Uuid::new_v4(),
        content: content.to_string(),
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        parent_id: None,
        likes_count: likes,
        is_liked,
        author: test_author_row("Commenter"),
    }
}

/// Create a reply row to `parent_id`
pub fn test_reply_row(parent_id: Uuid, content: &str, minutes_ago: i64) -> CommentRow {
    CommentRow {
        parent_id: Some(parent_id),
        ..test_comment_row(content, minutes_ago, 0, false)
    }
}

/// Create a notification row published `minutes_ago`
pub fn test_notification_row(title: &str, minutes_ago: i64) -> NotificationRow {
    NotificationRow {
        id: Uuid::new_v4(),
        kind: NotificationKind::Announcement,
        title: title.to_string(),
        message: format!("{} details", title),
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

// ============================================================================
// Store builders
// ============================================================================

/// Create a store over `backend` for a fresh signed-in viewer
pub fn test_store(backend: Arc<MockBackend>) -> OptimisticStore {
    OptimisticStore::new(backend, Some(test_viewer()))
}
