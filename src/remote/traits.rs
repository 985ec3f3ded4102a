//! Trait abstractions over the backend and the video-generation service
//!
//! Same shape as the rest of the crate's seams: async trait + `Send + Sync`
//! so implementations can be shared as `Arc<dyn ...>` and swapped for the
//! in-memory mocks in tests.

use super::error::RemoteError;
use super::models::*;
use async_trait::async_trait;
use uuid::Uuid;

/// Result type of every remote call
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Backend query / mutation / RPC surface consumed by the social store.
///
/// # Implementations
///
/// - [`RestBackend`](super::RestBackend): PostgREST over HTTP
/// - [`MockBackend`](super::mock::MockBackend): in-memory, with failure injection
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `rpc get_comments_for_post(post_id, viewer_id?)`
    async fn get_comments_for_post(
        &self,
        post_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> RemoteResult<Vec<CommentRow>>;

    /// Insert into the comment relation, returning the server-assigned columns
    async fn insert_comment(&self, row: &NewCommentRow) -> RemoteResult<InsertedComment>;

    /// Delete a comment row by id
    async fn delete_comment(&self, comment_id: Uuid) -> RemoteResult<()>;

    /// Insert into `comment_likes` or `post_likes`
    async fn insert_like(&self, row: &LikeRow) -> RemoteResult<()>;

    /// Delete from `comment_likes` or `post_likes`
    async fn delete_like(&self, row: &LikeRow) -> RemoteResult<()>;

    /// `rpc get_notifications()`
    async fn get_notifications(&self) -> RemoteResult<Vec<NotificationRow>>;
}

/// REST surface of the external video-generation service.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// `POST /videos`
    async fn create_video(&self, request: &CreateVideoRequest)
        -> RemoteResult<CreateVideoResponse>;

    /// `GET /videos/{id}`
    async fn get_video(&self, video_id: &str) -> RemoteResult<VideoStatusResponse>;

    /// `DELETE /videos/{id}`
    async fn delete_video(&self, video_id: &str) -> RemoteResult<()>;
}
