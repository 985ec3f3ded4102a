//! Wire shapes for the backend relations/RPCs and the video-generation API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Backend: comments
// ============================================================================

/// Author object embedded in a `get_comments_for_post` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One row returned by the `get_comments_for_post` RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    pub author: AuthorRow,
}

/// Parameters of the `get_comments_for_post` RPC
#[derive(Debug, Clone, Serialize)]
pub struct CommentsQuery {
    pub post_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_id: Option<Uuid>,
}

/// Row inserted into the comment relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommentRow {
    pub content: String,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
}

/// Server-assigned columns returned by a comment insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertedComment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Backend: likes
// ============================================================================

/// Row of either like relation.
///
/// Serializes as `{comment_id, user_id}` or `{post_id, user_id}` depending on
/// the subject, which is also how the relation (table) is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LikeRow {
    Comment { comment_id: Uuid, user_id: Uuid },
    Post { post_id: Uuid, user_id: Uuid },
}

impl LikeRow {
    /// Name of the relation this row belongs to
    pub fn relation(&self) -> &'static str {
        match self {
            Self::Comment { .. } => "comment_likes",
            Self::Post { .. } => "post_likes",
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Comment { user_id, .. } | Self::Post { user_id, .. } => *user_id,
        }
    }
}

// ============================================================================
// Backend: notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Announcement,
    Update,
    Promo,
}

/// One row returned by the `get_notifications` RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Video-generation API
// ============================================================================

/// Body of `POST /videos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVideoRequest {
    pub replica_id: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Response of `POST /videos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVideoResponse {
    pub video_id: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of `GET /videos/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStatusResponse {
    pub video_id: String,
    pub status: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}
