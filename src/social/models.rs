//! Comment, viewer and like-membership models

use crate::remote::models::{AuthorRow, CommentRow, NotificationKind, NotificationRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a comment.
///
/// A freshly posted comment carries a client-issued `Temporary` id until the
/// backend confirms it; reconciliation then swaps the whole record for one
/// carrying the `Server` id. Exactly one of the two is ever attached to a
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentId {
    Server(Uuid),
    Temporary(Uuid),
}

impl CommentId {
    /// Issue a new temporary id
    pub fn temporary() -> Self {
        Self::Temporary(Uuid::new_v4())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// The server id, if this comment has been confirmed
    pub fn server_id(&self) -> Option<Uuid> {
        match self {
            Self::Server(id) => Some(*id),
            Self::Temporary(_) => None,
        }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{}", id),
            Self::Temporary(id) => write!(f, "tmp-{}", id),
        }
    }
}

/// Author reference shown next to a comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        let display_name = row
            .display_name
            .clone()
            .or_else(|| row.username.clone())
            .unwrap_or_else(|| "Anonymous".to_string());
        Self {
            id: row.id,
            display_name,
            username: row.username,
            avatar: row.avatar,
        }
    }
}

/// The signed-in user on whose behalf mutations are issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: Uuid,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl Viewer {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            username: None,
            avatar: None,
        }
    }

    pub fn as_author(&self) -> Author {
        Author {
            id: self.id,
            display_name: self.display_name.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Immutable comment record.
///
/// Never mutated in place: every change produces a new record via the
/// `with_*` / `confirmed` constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
    pub liked_by_viewer: bool,
}

impl Comment {
    /// A not-yet-confirmed comment authored by the viewer
    pub fn pending(content: String, parent_id: Option<Uuid>, viewer: &Viewer) -> Self {
        Self {
            id: CommentId::temporary(),
            content,
            parent_id,
            author: viewer.as_author(),
            created_at: Utc::now(),
            likes_count: 0,
            liked_by_viewer: false,
        }
    }

    /// The same comment carrying its server identity
    pub fn confirmed(&self, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::Server(id),
            created_at,
            ..self.clone()
        }
    }

    /// The same comment with a different like state
    pub fn with_like_state(&self, state: LikeState) -> Self {
        Self {
            likes_count: state.count,
            liked_by_viewer: state.liked,
            ..self.clone()
        }
    }

    pub fn like_state(&self) -> LikeState {
        LikeState {
            liked: self.liked_by_viewer,
            count: self.likes_count,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::Server(row.id),
            content: row.content,
            parent_id: row.parent_id,
            author: row.author.into(),
            created_at: row.created_at,
            likes_count: row.likes_count,
            liked_by_viewer: row.is_liked,
        }
    }
}

/// Kind of entity a like applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Comment,
    Post,
}

/// The entity (post or comment) a like applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub id: Uuid,
}

impl Subject {
    pub fn comment(id: Uuid) -> Self {
        Self {
            kind: SubjectKind::Comment,
            id,
        }
    }

    pub fn post(id: Uuid) -> Self {
        Self {
            kind: SubjectKind::Post,
            id,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SubjectKind::Comment => "comment",
            SubjectKind::Post => "post",
        };
        write!(f, "{}:{}", kind, self.id)
    }
}

/// Membership key: presence in the set means "viewer likes subject"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LikeKey {
    pub subject: Subject,
    pub viewer_id: Uuid,
}

/// Membership flag and displayed counter of one subject, as one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub count: u32,
}

impl LikeState {
    /// The state after the viewer flips their like
    pub fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                count: self.count.saturating_add(1),
            }
        }
    }
}

/// A notification shown in the viewer's inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            title: row.title,
            message: row.message,
            created_at: row.created_at,
        }
    }
}
