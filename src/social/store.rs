//! Optimistic comment and like store
//!
//! Owns the ordered comment list of one post and the viewer's like
//! memberships for the screen that created it. Every mutation is applied
//! locally first (inside a short synchronous critical section), then sent to
//! the backend, then reconciled: confirmed in place on success, rolled back
//! exactly on failure. The lock is never held across an `.await`, so callers
//! can never observe a half-applied mutation.

use super::models::*;
use super::reconcile::{self, LikeSnapshot};
use crate::error::{Result, SyncError};
use crate::events::{EventEmitter, SyncEvent};
use crate::remote::models::{LikeRow, NewCommentRow};
use crate::remote::BackendApi;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default upper bound on comment length, in characters
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 2000;

/// Tunables of the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub max_comment_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_comment_length: DEFAULT_MAX_COMMENT_LENGTH,
        }
    }
}

/// Load status of the comment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    Loading,
    Loaded,
    /// The last load failed; the message is the normalized remote error
    Failed(String),
}

#[derive(Debug)]
struct StoreState {
    post_id: Option<Uuid>,
    load: LoadState,
    comments: Vec<Comment>,
    memberships: HashSet<LikeKey>,
    post_counts: HashMap<Uuid, u32>,
    in_flight: usize,
}

impl StoreState {
    fn like_state(&self, subject: Subject, viewer_id: Uuid) -> Option<LikeState> {
        let key = LikeKey { subject, viewer_id };
        match subject.kind {
            SubjectKind::Comment => self
                .comments
                .iter()
                .find(|c| c.id == CommentId::Server(subject.id))
                .map(|c| LikeState {
                    liked: self.memberships.contains(&key),
                    count: c.likes_count,
                }),
            SubjectKind::Post => self.post_counts.get(&subject.id).map(|count| LikeState {
                liked: self.memberships.contains(&key),
                count: *count,
            }),
        }
    }

    /// Set membership and counter of `subject` together.
    fn apply_like(&mut self, subject: Subject, viewer_id: Uuid, state: LikeState) {
        let key = LikeKey { subject, viewer_id };
        if state.liked {
            self.memberships.insert(key);
        } else {
            self.memberships.remove(&key);
        }
        match subject.kind {
            SubjectKind::Comment => {
                if let Some(slot) = self
                    .comments
                    .iter_mut()
                    .find(|c| c.id == CommentId::Server(subject.id))
                {
                    *slot = slot.with_like_state(state);
                }
            }
            SubjectKind::Post => {
                self.post_counts.insert(subject.id, state.count);
            }
        }
    }
}

/// Optimistic store for the comments and likes of one post.
pub struct OptimisticStore {
    backend: Arc<dyn BackendApi>,
    viewer: Option<Viewer>,
    config: StoreConfig,
    state: Mutex<StoreState>,
    emitter: Option<Arc<dyn EventEmitter>>,
}

impl OptimisticStore {
    /// Create an empty store. `viewer` is `None` for signed-out sessions,
    /// which may read but not mutate.
    pub fn new(backend: Arc<dyn BackendApi>, viewer: Option<Viewer>) -> Self {
        Self {
            backend,
            viewer,
            config: StoreConfig::default(),
            state: Mutex::new(StoreState {
                post_id: None,
                load: LoadState::Idle,
                comments: Vec::new(),
                memberships: HashSet::new(),
                post_counts: HashMap::new(),
                in_flight: 0,
            }),
            emitter: None,
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish reconciled-state events to `emitter`
    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(event);
        }
    }

    fn require_viewer(&self) -> Result<&Viewer> {
        self.viewer.as_ref().ok_or(SyncError::AuthRequired)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current ordered comments, most-recent-first
    pub fn comments(&self) -> Vec<Comment> {
        self.lock().comments.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().load.clone()
    }

    /// Post whose comments this store holds, once a load was requested
    pub fn post_id(&self) -> Option<Uuid> {
        self.lock().post_id
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    /// Membership flag and counter of a subject, if the store knows it
    pub fn like_state(&self, subject: Subject) -> Option<LikeState> {
        let viewer_id = self.viewer.as_ref().map(|v| v.id).unwrap_or_else(Uuid::nil);
        self.lock().like_state(subject, viewer_id)
    }

    pub fn is_liked(&self, subject: Subject) -> bool {
        self.like_state(subject).map(|s| s.liked).unwrap_or(false)
    }

    pub fn like_count(&self, subject: Subject) -> u32 {
        self.like_state(subject).map(|s| s.count).unwrap_or(0)
    }

    /// Number of mutations whose remote call has not completed yet
    pub fn pending_count(&self) -> usize {
        self.lock().in_flight
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load the comments of `post_id`, most-recent-first.
    ///
    /// On failure the store is left in `LoadState::Failed`. Pending comments
    /// of the same post that are still in flight survive a reload.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        {
            let mut state = self.lock();
            if state.post_id != Some(post_id) {
                state.comments.clear();
                state.memberships.retain(|k| k.subject.kind != SubjectKind::Comment);
            }
            state.post_id = Some(post_id);
            state.load = LoadState::Loading;
        }

        let viewer_id = self.viewer.as_ref().map(|v| v.id);
        let result = self.backend.get_comments_for_post(post_id, viewer_id).await;

        let mut state = self.lock();
        if state.post_id != Some(post_id) {
            // A load for another post started meanwhile; it owns the state now
            debug!(%post_id, "Discarding stale comment load");
            return result.map(|rows| rows.into_iter().map(Comment::from).collect()).map_err(Into::into);
        }

        match result {
            Ok(rows) => {
                let mut loaded: Vec<Comment> = rows.into_iter().map(Comment::from).collect();
                reconcile::order_most_recent_first(&mut loaded);

                let mut comments: Vec<Comment> = state
                    .comments
                    .iter()
                    .filter(|c| c.id.is_temporary())
                    .cloned()
                    .collect();
                comments.extend(loaded);

                state
                    .memberships
                    .retain(|k| k.subject.kind != SubjectKind::Comment);
                if let Some(viewer) = &self.viewer {
                    for c in comments.iter().filter(|c| c.liked_by_viewer) {
                        if let Some(id) = c.id.server_id() {
                            state.memberships.insert(LikeKey {
                                subject: Subject::comment(id),
                                viewer_id: viewer.id,
                            });
                        }
                    }
                }

                state.comments = comments.clone();
                state.load = LoadState::Loaded;
                drop(state);

                debug!(%post_id, count = comments.len(), "Comments loaded");
                self.emit(SyncEvent::CommentsLoaded {
                    post_id,
                    count: comments.len(),
                });
                Ok(comments)
            }
            Err(err) => {
                state.load = LoadState::Failed(err.to_string());
                drop(state);

                warn!(%post_id, "Failed to load comments: {}", err);
                self.emit(SyncEvent::CommentsLoadFailed {
                    post_id,
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn validate_content(&self, content: &str) -> Result<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(SyncError::validation("comment cannot be empty"));
        }
        let len = trimmed.chars().count();
        if len > self.config.max_comment_length {
            return Err(SyncError::validation(format!(
                "comment is {} characters, the limit is {}",
                len, self.config.max_comment_length
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Post a comment (or a reply when `parent_id` is set).
    ///
    /// The comment is visible at the head of the list as soon as this future
    /// is first polled. On success the pending record is replaced in place by
    /// the confirmed one, which is returned; on failure it is removed and the
    /// error returned.
    pub async fn add_comment(&self, content: &str, parent_id: Option<Uuid>) -> Result<Comment> {
        let viewer = self.require_viewer()?;
        let content = self.validate_content(content)?;

        let (post_id, pending) = {
            let mut state = self.lock();
            let post_id = state
                .post_id
                .ok_or_else(|| SyncError::validation("no post selected"))?;
            if let Some(parent) = parent_id {
                let known = state
                    .comments
                    .iter()
                    .any(|c| c.id == CommentId::Server(parent));
                if !known {
                    return Err(SyncError::validation(format!(
                        "parent comment {} not found",
                        parent
                    )));
                }
            }

            let pending = Comment::pending(content, parent_id, viewer);
            reconcile::insert_pending(&mut state.comments, pending.clone());
            state.in_flight += 1;
            (post_id, pending)
        };
        debug!(%post_id, id = %pending.id, "Comment applied optimistically");
        self.emit(SyncEvent::CommentAdded {
            post_id,
            id: pending.id,
        });

        let row = NewCommentRow {
            content: pending.content.clone(),
            post_id,
            user_id: viewer.id,
            parent_id,
        };
        let result = self.backend.insert_comment(&row).await;

        let mut state = self.lock();
        state.in_flight -= 1;
        match result {
            Ok(inserted) => {
                let confirmed = reconcile::confirm_pending(&mut state.comments, pending.id, &inserted);
                drop(state);

                let confirmed = match confirmed {
                    Some(c) => {
                        debug!(%post_id, temp_id = %pending.id, id = %c.id, "Comment confirmed");
                        self.emit(SyncEvent::CommentConfirmed {
                            post_id,
                            temp_id: pending.id,
                            id: c.id,
                        });
                        c
                    }
                    None => {
                        debug!(temp_id = %pending.id, "Confirmed comment no longer listed");
                        pending.confirmed(inserted.id, inserted.created_at)
                    }
                };
                Ok(confirmed)
            }
            Err(err) => {
                reconcile::take(&mut state.comments, pending.id);
                drop(state);

                warn!(%post_id, temp_id = %pending.id, "Comment insert failed, rolled back: {}", err);
                self.emit(SyncEvent::CommentRolledBack {
                    post_id,
                    temp_id: pending.id,
                });
                Err(err.into())
            }
        }
    }

    /// Delete one of the viewer's own confirmed comments.
    ///
    /// Removed locally first; if the backend delete fails the record is put
    /// back at the index it held.
    pub async fn delete_comment(&self, id: CommentId) -> Result<()> {
        let viewer = self.require_viewer()?;
        let server_id = id
            .server_id()
            .ok_or_else(|| SyncError::validation("comment is still being posted"))?;

        let (post_id, index, removed) = {
            let mut state = self.lock();
            let post_id = state
                .post_id
                .ok_or_else(|| SyncError::validation("no post selected"))?;
            let author = state
                .comments
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.author.id)
                .ok_or_else(|| SyncError::validation(format!("comment {} not found", id)))?;
            if author != viewer.id {
                return Err(SyncError::validation("only the author can delete a comment"));
            }
            let (index, removed) = reconcile::take(&mut state.comments, id)
                .ok_or_else(|| SyncError::validation(format!("comment {} not found", id)))?;
            state.in_flight += 1;
            (post_id, index, removed)
        };
        self.emit(SyncEvent::CommentRemoved { post_id, id });

        let result = self.backend.delete_comment(server_id).await;

        let mut state = self.lock();
        state.in_flight -= 1;
        match result {
            Ok(()) => {
                state.memberships.remove(&LikeKey {
                    subject: Subject::comment(server_id),
                    viewer_id: viewer.id,
                });
                drop(state);
                debug!(%post_id, %id, "Comment deleted");
                Ok(())
            }
            Err(err) => {
                reconcile::restore_at(&mut state.comments, index, removed);
                drop(state);

                warn!(%post_id, %id, "Comment delete failed, restored: {}", err);
                self.emit(SyncEvent::CommentRestored { post_id, id });
                Err(err.into())
            }
        }
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Register a post's counter and membership as rendered by the feed, so
    /// the post can be liked through this store.
    pub fn seed_post_like(&self, post_id: Uuid, count: u32, liked: bool) {
        let viewer_id = self.viewer.as_ref().map(|v| v.id).unwrap_or_else(Uuid::nil);
        self.lock().apply_like(
            Subject::post(post_id),
            viewer_id,
            LikeState { liked, count },
        );
    }

    /// Flip the viewer's like on a post or comment.
    ///
    /// Membership and counter change together before the remote call. On
    /// failure both are restored to the values captured when this call was
    /// made and the error is returned. Returns the applied state on success.
    pub async fn toggle_like(&self, subject_id: Uuid, kind: SubjectKind) -> Result<LikeState> {
        let viewer = self.require_viewer()?;
        let subject = Subject { kind, id: subject_id };

        let snapshot = {
            let mut state = self.lock();
            let before = state
                .like_state(subject, viewer.id)
                .ok_or_else(|| SyncError::validation(format!("unknown subject {}", subject)))?;
            let snapshot = LikeSnapshot::capture(subject, before);
            state.apply_like(subject, viewer.id, snapshot.applied);
            state.in_flight += 1;
            snapshot
        };
        debug!(%subject, liked = snapshot.applied.liked, count = snapshot.applied.count, "Like applied optimistically");
        self.emit(SyncEvent::LikeChanged {
            subject,
            state: snapshot.applied,
        });

        let row = match kind {
            SubjectKind::Comment => LikeRow::Comment {
                comment_id: subject_id,
                user_id: viewer.id,
            },
            SubjectKind::Post => LikeRow::Post {
                post_id: subject_id,
                user_id: viewer.id,
            },
        };
        let result = if snapshot.is_like() {
            self.backend.insert_like(&row).await
        } else {
            self.backend.delete_like(&row).await
        };

        let mut state = self.lock();
        state.in_flight -= 1;
        match result {
            Ok(()) => Ok(snapshot.applied),
            Err(err) => {
                state.apply_like(subject, viewer.id, snapshot.before);
                drop(state);

                warn!(%subject, "Like toggle failed, restored snapshot: {}", err);
                self.emit(SyncEvent::LikeRolledBack {
                    subject,
                    state: snapshot.before,
                });
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::MockBackend;
    use crate::test_helpers::{test_comment_row, test_reply_row, test_store, test_viewer};

    fn store_with(backend: Arc<MockBackend>, viewer: Option<Viewer>) -> OptimisticStore {
        OptimisticStore::new(backend, viewer)
    }

    #[tokio::test]
    async fn test_list_orders_most_recent_first_and_tracks_likes() {
        let post_id = Uuid::new_v4();
        let v = test_viewer();
        let backend = Arc::new(MockBackend::new().with_comments(
            post_id,
            vec![
                test_comment_row("older", 30, 1, false),
                test_comment_row("newest", 1, 4, true),
            ],
        ));
        let store = store_with(backend, Some(v));

        let comments = store.list_comments(post_id).await.unwrap();
        assert_eq!(comments[0].content, "newest");
        assert_eq!(comments[1].content, "older");
        assert_eq!(store.load_state(), LoadState::Loaded);

        let liked = Subject::comment(comments[0].id.server_id().unwrap());
        assert!(store.is_liked(liked));
        assert_eq!(store.like_state(liked).unwrap().count, 4);
    }

    #[tokio::test]
    async fn test_list_failure_sets_error_state() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_fetches(true);
        let store = store_with(backend, Some(test_viewer()));

        let err = store.list_comments(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
        assert!(matches!(store.load_state(), LoadState::Failed(_)));
        assert!(store.comments().is_empty());
    }

    #[tokio::test]
    async fn test_validation_and_auth_reject_before_mutation() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(MockBackend::new());
        let signed_out = store_with(backend.clone(), None);
        signed_out.list_comments(post_id).await.unwrap();

        assert_eq!(
            signed_out.add_comment("hi", None).await.unwrap_err(),
            SyncError::AuthRequired
        );

        let store = store_with(backend.clone(), Some(test_viewer()))
            .with_config(StoreConfig { max_comment_length: 5 });
        store.list_comments(post_id).await.unwrap();
        let calls_before = backend.call_count();

        assert!(matches!(
            store.add_comment("   ", None).await,
            Err(SyncError::Validation(_))
        ));
        assert!(matches!(
            store.add_comment("too long", None).await,
            Err(SyncError::Validation(_))
        ));
        assert!(matches!(
            store.add_comment("hi", Some(Uuid::new_v4())).await,
            Err(SyncError::Validation(_))
        ));
        assert!(store.comments().is_empty());
        assert_eq!(backend.call_count(), calls_before, "no remote call expected");
    }

    #[tokio::test]
    async fn test_add_comment_requires_loaded_post() {
        let store = store_with(Arc::new(MockBackend::new()), Some(test_viewer()));
        assert!(matches!(
            store.add_comment("hello", None).await,
            Err(SyncError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_comment_visible_before_backend_resolves() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(MockBackend::new());
        let store = store_with(backend.clone(), Some(test_viewer()));
        store.list_comments(post_id).await.unwrap();
        let gate = backend.gate_writes();

        let observe = async {
            tokio::task::yield_now().await;
            // The add future has been polled and is parked on the gate
            let listed = store.comments();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].content, "first!");
            assert!(listed[0].id.is_temporary());
            assert_eq!(listed[0].likes_count, 0);
            assert_eq!(store.pending_count(), 1);
            gate.add_permits(1);
        };
        let (added, ()) = tokio::join!(store.add_comment("first!", None), observe);

        let added = added.unwrap();
        assert!(!added.id.is_temporary());
        let listed = store.comments();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, added.id);
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_only_its_comment() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(
            MockBackend::new().with_comments(post_id, vec![test_comment_row("existing", 5, 0, false)]),
        );
        backend.fail_comments_containing("doomed");
        let store = store_with(backend, Some(test_viewer()));
        store.list_comments(post_id).await.unwrap();

        let err = store.add_comment("doomed remark", None).await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));

        let listed = store.comments();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "existing");
    }

    #[tokio::test]
    async fn test_toggle_like_rollback_restores_snapshot() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(MockBackend::new());
        backend.script_like_outcomes([false]);
        let store = store_with(backend, Some(test_viewer()));
        store.seed_post_like(post_id, 5, false);

        let err = store.toggle_like(post_id, SubjectKind::Post).await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
        assert_eq!(
            store.like_state(Subject::post(post_id)).unwrap(),
            LikeState {
                liked: false,
                count: 5
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_like_twice_returns_to_original() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(MockBackend::new());
        let store = store_with(backend.clone(), Some(test_viewer()));
        store.seed_post_like(post_id, 5, false);

        let first = store.toggle_like(post_id, SubjectKind::Post).await.unwrap();
        assert_eq!(first, LikeState { liked: true, count: 6 });
        let second = store.toggle_like(post_id, SubjectKind::Post).await.unwrap();
        assert_eq!(second, LikeState { liked: false, count: 5 });
        assert!(backend.like_rows().await.is_empty());
        assert_eq!(backend.calls(), vec!["insert_like", "delete_like"]);
    }

    #[tokio::test]
    async fn test_toggle_like_on_comment_updates_record() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(
            MockBackend::new().with_comments(post_id, vec![test_comment_row("nice", 2, 3, false)]),
        );
        let store = store_with(backend, Some(test_viewer()));
        let comments = store.list_comments(post_id).await.unwrap();
        let comment_id = comments[0].id.server_id().unwrap();

        store
            .toggle_like(comment_id, SubjectKind::Comment)
            .await
            .unwrap();
        let updated = &store.comments()[0];
        assert!(updated.liked_by_viewer);
        assert_eq!(updated.likes_count, 4);
        assert!(store.is_liked(Subject::comment(comment_id)));
    }

    #[tokio::test]
    async fn test_toggle_like_requires_auth_and_known_subject() {
        let store = store_with(Arc::new(MockBackend::new()), None);
        assert_eq!(
            store
                .toggle_like(Uuid::new_v4(), SubjectKind::Post)
                .await
                .unwrap_err(),
            SyncError::AuthRequired
        );

        let store = store_with(Arc::new(MockBackend::new()), Some(test_viewer()));
        assert!(matches!(
            store.toggle_like(Uuid::new_v4(), SubjectKind::Comment).await,
            Err(SyncError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_comment_failure_restores_position() {
        let post_id = Uuid::new_v4();
        let v = test_viewer();
        let mut mine = test_comment_row("mine", 10, 0, false);
        mine.author.id = v.id;
        let backend = Arc::new(MockBackend::new().with_comments(
            post_id,
            vec![
                test_comment_row("newest", 1, 0, false),
                mine,
                test_comment_row("oldest", 20, 0, false),
            ],
        ));
        backend.fail_comment_deletes(true);
        let store = store_with(backend, Some(v));
        let comments = store.list_comments(post_id).await.unwrap();
        let target = comments[1].id;

        assert!(store.delete_comment(target).await.is_err());
        let listed = store.comments();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].id, target);
    }

    #[tokio::test]
    async fn test_delete_comment_rejects_foreign_and_pending() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(
            MockBackend::new().with_comments(post_id, vec![test_comment_row("theirs", 1, 0, false)]),
        );
        let store = store_with(backend.clone(), Some(test_viewer()));
        let comments = store.list_comments(post_id).await.unwrap();

        assert!(matches!(
            store.delete_comment(comments[0].id).await,
            Err(SyncError::Validation(_))
        ));
        assert!(matches!(
            store.delete_comment(CommentId::temporary()).await,
            Err(SyncError::Validation(_))
        ));
        assert_eq!(store.comments().len(), 1);
        assert!(!backend.calls().contains(&"delete_comment"));
    }

    #[tokio::test]
    async fn test_reload_during_insert_lists_comment_once() {
        let post_id = Uuid::new_v4();
        let backend = Arc::new(MockBackend::new());
        let store = test_store(backend.clone());
        store.list_comments(post_id).await.unwrap();
        let acks = backend.gate_insert_acks();

        let reload = async {
            tokio::task::yield_now().await;
            // The row is committed but the insert response is still held
            let listed = store.list_comments(post_id).await.unwrap();
            assert_eq!(listed.len(), 2);
            assert!(listed[0].id.is_temporary());
            acks.add_permits(1);
        };
        let (added, ()) = tokio::join!(store.add_comment("racing", None), reload);
        let added = added.unwrap();

        let listed = store.comments();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, added.id);
        assert!(!added.id.is_temporary());
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_replies_keep_parent_link() {
        let post_id = Uuid::new_v4();
        let parent = test_comment_row("parent", 30, 0, false);
        let parent_id = parent.id;
        let backend = Arc::new(MockBackend::new().with_comments(
            post_id,
            vec![parent, test_reply_row(parent_id, "child", 5)],
        ));
        let store = test_store(backend);

        let listed = store.list_comments(post_id).await.unwrap();
        assert_eq!(listed[0].content, "child");
        assert_eq!(listed[0].parent_id, Some(parent_id));
        assert!(listed[0].is_reply());
        assert!(!listed[1].is_reply());
    }
}
