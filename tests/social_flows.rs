//! End-to-end flows of the comment store against the in-memory backend

use chrono::{Duration, Utc};
use futures::future::join_all;
use promptshare_sync::events::{EventBus, SyncEvent};
use promptshare_sync::remote::mock::MockBackend;
use promptshare_sync::remote::models::{AuthorRow, CommentRow, LikeRow};
use promptshare_sync::social::{LikeState, OptimisticStore, Subject, SubjectKind, Viewer};
use promptshare_sync::SyncError;
use std::sync::Arc;
use uuid::Uuid;

fn viewer() -> Viewer {
    Viewer::new(Uuid::new_v4(), "Integration Viewer")
}

fn row(content: &str, minutes_ago: i64) -> CommentRow {
    CommentRow {
        id: Uuid::new_v4(),
        content: content.to_string(),
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        parent_id: None,
        likes_count: 0,
        is_liked: false,
        author: AuthorRow {
            id: Uuid::new_v4(),
            display_name: Some("Someone".into()),
            username: None,
            avatar: None,
        },
    }
}

#[tokio::test]
async fn test_concurrent_comments_reconcile_independently() {
    let post_id = Uuid::new_v4();
    let backend = Arc::new(MockBackend::new().with_comments(post_id, vec![row("existing", 60)]));
    backend.fail_comments_containing("second");
    let store = OptimisticStore::new(backend.clone(), Some(viewer()));
    store.list_comments(post_id).await.unwrap();

    let gate = backend.gate_writes();
    let adds = join_all(vec![
        store.add_comment("first", None),
        store.add_comment("second", None),
        store.add_comment("third", None),
    ]);
    let observe = async {
        tokio::task::yield_now().await;
        let listed: Vec<_> = store.comments().into_iter().map(|c| c.content).collect();
        assert_eq!(listed, vec!["third", "second", "first", "existing"]);
        assert_eq!(store.pending_count(), 3);
        gate.add_permits(3);
    };
    let (results, ()) = tokio::join!(adds, observe);

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SyncError::Fetch(_))));
    assert!(results[2].is_ok());

    let listed = store.comments();
    let contents: Vec<_> = listed.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["third", "first", "existing"]);
    assert!(listed.iter().all(|c| !c.id.is_temporary()));
    assert_eq!(store.pending_count(), 0);
    assert_eq!(backend.comment_rows(post_id).await.len(), 3);
}

#[tokio::test]
async fn test_overlapping_like_toggles_stay_consistent_with_backend() {
    let post_id = Uuid::new_v4();
    let v = viewer();
    let viewer_id = v.id;
    let backend = Arc::new(MockBackend::new());
    // The like insert fails, the unlike that follows it succeeds
    backend.script_like_outcomes([false, true]);
    let store = OptimisticStore::new(backend.clone(), Some(v));
    store.seed_post_like(post_id, 5, false);

    let gate = backend.gate_writes();
    let release = async {
        tokio::task::yield_now().await;
        assert_eq!(
            store.like_state(Subject::post(post_id)),
            Some(LikeState {
                liked: false,
                count: 5
            })
        );
        gate.add_permits(2);
    };
    let (first, second, ()) = tokio::join!(
        store.toggle_like(post_id, SubjectKind::Post),
        store.toggle_like(post_id, SubjectKind::Post),
        release
    );

    assert!(first.is_err());
    assert!(second.is_ok());
    let state = store.like_state(Subject::post(post_id)).unwrap();
    assert_eq!(state, LikeState { liked: false, count: 5 });

    let server_liked = backend.like_rows().await.contains(&LikeRow::Post {
        post_id,
        user_id: viewer_id,
    });
    assert_eq!(server_liked, state.liked);
}

#[tokio::test]
async fn test_reply_and_delete_flow_emits_reconciled_events() {
    let post_id = Uuid::new_v4();
    let parent = row("parent", 10);
    let parent_id = parent.id;
    let backend = Arc::new(MockBackend::new().with_comments(post_id, vec![parent]));
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let store = OptimisticStore::new(backend.clone(), Some(viewer())).with_emitter(bus.clone());

    store.list_comments(post_id).await.unwrap();
    let reply = store.add_comment("  a reply  ", Some(parent_id)).await.unwrap();
    assert_eq!(reply.content, "a reply");
    assert!(reply.is_reply());

    store.delete_comment(reply.id).await.unwrap();
    assert_eq!(store.comments().len(), 1);
    assert_eq!(backend.comment_rows(post_id).await.len(), 1);

    let names: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|e| e.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "comments_loaded",
            "comment_added",
            "comment_confirmed",
            "comment_removed"
        ]
    );
}

#[tokio::test]
async fn test_failed_load_is_observable() {
    let backend = Arc::new(MockBackend::new());
    backend.fail_fetches(true);
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let store = OptimisticStore::new(backend, None).with_emitter(bus.clone());

    assert!(store.list_comments(Uuid::new_v4()).await.is_err());
    match rx.try_recv().unwrap() {
        SyncEvent::CommentsLoadFailed { message, .. } => assert!(message.contains("network")),
        other => panic!("unexpected event {other:?}"),
    }
}
