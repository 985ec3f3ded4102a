//! Video job lifecycle through `Services`, simulated and over HTTP

use promptshare_sync::jobs::{JobMode, JobStatus};
use promptshare_sync::remote::mock::MockBackend;
use promptshare_sync::remote::{HttpVideoApi, VideoApi};
use promptshare_sync::{Config, Services};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    Config {
        backend_url: "http://localhost:54321".into(),
        backend_anon_key: "anon".into(),
        backend_timeout: Duration::from_secs(1),
        video_api_url: "http://localhost:9".into(),
        video_api_key: None,
        video_replica_id: Some("r-default".into()),
        video_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(5),
        poll_max_attempts: 20,
        poll_max_consecutive_errors: 2,
        comment_max_length: 2000,
    }
}

fn services_with_video(video: Option<Arc<dyn VideoApi>>) -> Services {
    Services::with_clients(test_config(), Arc::new(MockBackend::new()), video)
}

#[tokio::test]
async fn test_simulated_job_without_api_key() {
    let services = services_with_video(None);
    let mut rx = services.events.subscribe();
    let mut engine = services.job_engine();

    let job = engine.create_job("A short script", "r-1").await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.mode, JobMode::Simulated);

    let mut polls = 0;
    let done = services
        .poll_scheduler()
        .drive(&mut engine, |_| polls += 1)
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(polls, 4);
    assert!(!done.result.unwrap().video_url.is_empty());

    let mut statuses = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let promptshare_sync::events::SyncEvent::JobUpdated { status, .. } = event {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![JobStatus::Queued, JobStatus::Generating, JobStatus::Completed]
    );
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_simulation() {
    // Nothing listens on the discard port
    let api = HttpVideoApi::new("http://127.0.0.1:9", "key", Duration::from_secs(2)).unwrap();
    let services = services_with_video(Some(Arc::new(api)));
    let mut engine = services.job_engine();
    assert_eq!(engine.mode(), JobMode::Remote);

    let job = engine.create_job("script", "r-1").await.unwrap();
    assert_eq!(job.mode, JobMode::Simulated);
    let done = services
        .poll_scheduler()
        .drive(&mut engine, |_| {})
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_remote_job_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(header("x-api-key", "live-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "video_id": "v-77",
            "status": "queued",
            "created_at": "2026-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos/v-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "video_id": "v-77",
            "status": "ready",
            "download_url": "https://cdn.example.com/v-77.mp4",
            "thumbnail_url": "https://cdn.example.com/v-77.jpg",
            "duration": 12.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/videos/v-77"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpVideoApi::new(&server.uri(), "live-key", Duration::from_secs(5)).unwrap();
    let services = services_with_video(Some(Arc::new(api)));
    let mut engine = services.job_engine();

    let job = engine.create_job("script", "r-1").await.unwrap();
    assert_eq!(job.id, "v-77");
    assert_eq!(job.mode, JobMode::Remote);

    let done = services
        .poll_scheduler()
        .drive(&mut engine, |_| {})
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    let result = done.result.unwrap();
    assert_eq!(result.video_url, "https://cdn.example.com/v-77.mp4");
    assert_eq!(result.duration_secs, Some(12.5));

    // Terminal: no further GET
    assert_eq!(engine.poll_status().await.unwrap().status, JobStatus::Completed);
    engine.delete_job().await.unwrap();
}
