//! In-memory mock implementations of `BackendApi` and `VideoApi`
//!
//! Used by unit and integration tests to run the store and the job engine
//! without a network. Both mocks support failure injection, and the backend
//! mock can hold writes behind a gate so tests can observe optimistic state
//! while a request is still "in flight".

use super::error::{ErrorCategory, RemoteError};
use super::models::*;
use super::traits::{BackendApi, RemoteResult, VideoApi};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{RwLock, Semaphore};
use uuid::Uuid;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Faults {
    fail_fetch: bool,
    fail_comments_containing: Vec<String>,
    fail_comment_deletes: bool,
    /// Scripted like outcomes in call order; `false` fails that call
    like_outcomes: VecDeque<bool>,
}

// ============================================================================
// MockBackend
// ============================================================================

/// In-memory backend storing comments, like rows and notifications.
///
/// ```
/// use promptshare_sync::remote::mock::MockBackend;
/// use promptshare_sync::remote::BackendApi;
/// use uuid::Uuid;
///
/// # tokio_test::block_on(async {
/// let backend = MockBackend::new();
/// let rows = backend.get_comments_for_post(Uuid::new_v4(), None).await.unwrap();
/// assert!(rows.is_empty());
/// assert_eq!(backend.calls(), vec!["get_comments_for_post"]);
/// # });
/// ```
pub struct MockBackend {
    comments: RwLock<HashMap<Uuid, Vec<CommentRow>>>,
    likes: RwLock<HashSet<LikeRow>>,
    notifications: RwLock<Vec<NotificationRow>>,
    faults: Mutex<Faults>,
    write_gate: Mutex<Option<Arc<Semaphore>>>,
    ack_gate: Mutex<Option<Arc<Semaphore>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create an empty mock backend
    pub fn new() -> Self {
        Self {
            comments: RwLock::new(HashMap::new()),
            likes: RwLock::new(HashSet::new()),
            notifications: RwLock::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
            write_gate: Mutex::new(None),
            ack_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed the comment rows returned for `post_id`
    pub fn with_comments(mut self, post_id: Uuid, rows: Vec<CommentRow>) -> Self {
        self.comments.get_mut().insert(post_id, rows);
        self
    }

    /// Seed the notification rows
    pub fn with_notifications(mut self, rows: Vec<NotificationRow>) -> Self {
        *self.notifications.get_mut() = rows;
        self
    }

    /// Make every read RPC fail with a network error
    pub fn fail_fetches(&self, fail: bool) {
        lock(&self.faults).fail_fetch = fail;
    }

    /// Reject comment inserts whose content contains `needle`
    pub fn fail_comments_containing(&self, needle: impl Into<String>) {
        lock(&self.faults).fail_comments_containing.push(needle.into());
    }

    /// Make comment deletes fail with a server error
    pub fn fail_comment_deletes(&self, fail: bool) {
        lock(&self.faults).fail_comment_deletes = fail;
    }

    /// Script the outcome of the next like calls (insert or delete), in call
    /// order. Calls beyond the script succeed.
    pub fn script_like_outcomes(&self, outcomes: impl IntoIterator<Item = bool>) {
        lock(&self.faults).like_outcomes.extend(outcomes);
    }

    /// Hold every subsequent write until a permit is added to the returned
    /// semaphore. Writes are released in arrival order.
    pub fn gate_writes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.write_gate) = Some(gate.clone());
        gate
    }

    /// Commit every subsequent comment insert immediately but hold its
    /// response until a permit is added to the returned semaphore.
    pub fn gate_insert_acks(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.ack_gate) = Some(gate.clone());
        gate
    }

    /// Names of the remote operations invoked so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    /// Number of remote operations invoked so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Snapshot of the stored like rows
    pub async fn like_rows(&self) -> HashSet<LikeRow> {
        self.likes.read().await.clone()
    }

    /// Snapshot of the stored comment rows for a post
    pub async fn comment_rows(&self, post_id: Uuid) -> Vec<CommentRow> {
        self.comments
            .read()
            .await
            .get(&post_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, op: &'static str) {
        lock(&self.calls).push(op);
    }

    async fn pass_gate(&self) {
        Self::wait_on(&self.write_gate).await;
    }

    async fn wait_on(slot: &Mutex<Option<Arc<Semaphore>>>) {
        let gate = lock(slot).clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn next_like_outcome(&self) -> bool {
        lock(&self.faults).like_outcomes.pop_front().unwrap_or(true)
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn get_comments_for_post(
        &self,
        post_id: Uuid,
        _viewer_id: Option<Uuid>,
    ) -> RemoteResult<Vec<CommentRow>> {
        self.record("get_comments_for_post");
        if lock(&self.faults).fail_fetch {
            return Err(RemoteError::network("mock: connection refused"));
        }
        Ok(self.comment_rows(post_id).await)
    }

    async fn insert_comment(&self, row: &NewCommentRow) -> RemoteResult<InsertedComment> {
        self.record("insert_comment");
        let rejected = lock(&self.faults)
            .fail_comments_containing
            .iter()
            .any(|needle| row.content.contains(needle.as_str()));
        self.pass_gate().await;
        if rejected {
            return Err(RemoteError::from_status(500, "mock: insert failed"));
        }

        let inserted = InsertedComment {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let stored = CommentRow {
            id: inserted.id,
            content: row.content.clone(),
            created_at: inserted.created_at,
            parent_id: row.parent_id,
            likes_count: 0,
            is_liked: false,
            author: AuthorRow {
                id: row.user_id,
                display_name: None,
                username: None,
                avatar: None,
            },
        };
        self.comments
            .write()
            .await
            .entry(row.post_id)
            .or_default()
            .push(stored);
        Self::wait_on(&self.ack_gate).await;
        Ok(inserted)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> RemoteResult<()> {
        self.record("delete_comment");
        let fail = lock(&self.faults).fail_comment_deletes;
        self.pass_gate().await;
        if fail {
            return Err(RemoteError::from_status(500, "mock: delete failed"));
        }
        for rows in self.comments.write().await.values_mut() {
            rows.retain(|r| r.id != comment_id);
        }
        Ok(())
    }

    async fn insert_like(&self, row: &LikeRow) -> RemoteResult<()> {
        self.record("insert_like");
        let ok = self.next_like_outcome();
        self.pass_gate().await;
        if !ok {
            return Err(RemoteError::network("mock: like insert dropped"));
        }
        if !self.likes.write().await.insert(row.clone()) {
            return Err(RemoteError::new(
                ErrorCategory::Rejected,
                "mock: duplicate like",
            ));
        }
        Ok(())
    }

    async fn delete_like(&self, row: &LikeRow) -> RemoteResult<()> {
        self.record("delete_like");
        let ok = self.next_like_outcome();
        self.pass_gate().await;
        if !ok {
            return Err(RemoteError::network("mock: like delete dropped"));
        }
        self.likes.write().await.remove(row);
        Ok(())
    }

    async fn get_notifications(&self) -> RemoteResult<Vec<NotificationRow>> {
        self.record("get_notifications");
        if lock(&self.faults).fail_fetch {
            return Err(RemoteError::network("mock: connection refused"));
        }
        Ok(self.notifications.read().await.clone())
    }
}

// ============================================================================
// MockVideoApi
// ============================================================================

/// Scripted video-generation API.
///
/// `get_video` replays the scripted responses in order and keeps repeating
/// the last one once the script is exhausted.
pub struct MockVideoApi {
    create_result: Mutex<Option<RemoteError>>,
    script: Mutex<VecDeque<RemoteResult<VideoStatusResponse>>>,
    last: Mutex<Option<RemoteResult<VideoStatusResponse>>>,
    get_calls: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl Default for MockVideoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVideoApi {
    pub fn new() -> Self {
        Self {
            create_result: Mutex::new(None),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            get_calls: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Make `create_video` fail with `err`
    pub fn fail_create(self, err: RemoteError) -> Self {
        *lock(&self.create_result) = Some(err);
        self
    }

    /// Append a status report (`status` as the service spells it)
    pub fn then_status(self, status: &str) -> Self {
        lock(&self.script).push_back(Ok(Self::report(status, None)));
        self
    }

    /// Append a finished report carrying a result url
    pub fn then_ready(self, download_url: &str) -> Self {
        lock(&self.script).push_back(Ok(Self::report("ready", Some(download_url))));
        self
    }

    /// Append a transport failure
    pub fn then_error(self, err: RemoteError) -> Self {
        lock(&self.script).push_back(Err(err));
        self
    }

    /// Number of `get_video` calls received
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to `delete_video`
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }

    fn report(status: &str, download_url: Option<&str>) -> VideoStatusResponse {
        VideoStatusResponse {
            video_id: "mock-video".into(),
            status: status.into(),
            download_url: download_url.map(str::to_string),
            thumbnail_url: download_url.map(|u| format!("{u}.jpg")),
            duration: download_url.map(|_| 8.0),
        }
    }
}

#[async_trait]
impl VideoApi for MockVideoApi {
    async fn create_video(
        &self,
        _request: &CreateVideoRequest,
    ) -> RemoteResult<CreateVideoResponse> {
        if let Some(err) = lock(&self.create_result).clone() {
            return Err(err);
        }
        Ok(CreateVideoResponse {
            video_id: "mock-video".into(),
            status: "queued".into(),
            created_at: Some(Utc::now()),
        })
    }

    async fn get_video(&self, video_id: &str) -> RemoteResult<VideoStatusResponse> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.script).pop_front();
        let mut last = lock(&self.last);
        let response = match next {
            Some(r) => {
                *last = Some(r.clone());
                r
            }
            None => last
                .clone()
                .unwrap_or_else(|| Ok(Self::report("queued", None))),
        };
        response.map(|mut r| {
            r.video_id = video_id.to_string();
            r
        })
    }

    async fn delete_video(&self, video_id: &str) -> RemoteResult<()> {
        lock(&self.deleted).push(video_id.to_string());
        Ok(())
    }
}
