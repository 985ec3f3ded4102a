//! Job backends: the real video service and a deterministic simulation
//!
//! Both sit behind `JobBackend` so the engine never branches on which one is
//! active.

use super::models::*;
use crate::remote::models::{CreateVideoRequest, VideoStatusResponse};
use crate::remote::{ErrorCategory, RemoteError, RemoteResult, VideoApi};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Simulated polls that report `generating` before the job completes
pub const SIMULATED_GENERATING_POLLS: u32 = 3;

/// Canned result returned by simulated jobs
pub const SIMULATED_VIDEO_URL: &str = "https://cdn.promptshare.app/samples/simulated-video.mp4";
pub const SIMULATED_THUMBNAIL_URL: &str =
    "https://cdn.promptshare.app/samples/simulated-video.jpg";
pub const SIMULATED_DURATION_SECS: f64 = 30.0;

/// Capability interface over a job-running service
#[async_trait]
pub trait JobBackend: Send + Sync {
    fn mode(&self) -> JobMode;

    async fn create(&self, request: &CreateJobRequest) -> RemoteResult<CreatedJob>;

    async fn query(&self, job_id: &str) -> RemoteResult<JobReport>;

    async fn delete(&self, job_id: &str) -> RemoteResult<()>;
}

// ============================================================================
// Remote
// ============================================================================

/// Backend delegating to the external video service
pub struct RemoteJobBackend {
    api: Arc<dyn VideoApi>,
}

impl RemoteJobBackend {
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self { api }
    }
}

fn report_from(response: VideoStatusResponse) -> JobReport {
    let status = JobStatus::from_service(&response.status);
    let result = match (status, response.download_url) {
        (JobStatus::Completed, Some(video_url)) => Some(JobResult {
            video_url,
            thumbnail_url: response.thumbnail_url,
            duration_secs: response.duration,
        }),
        _ => None,
    };
    JobReport {
        status,
        result,
        attempt: None,
    }
}

#[async_trait]
impl JobBackend for RemoteJobBackend {
    fn mode(&self) -> JobMode {
        JobMode::Remote
    }

    async fn create(&self, request: &CreateJobRequest) -> RemoteResult<CreatedJob> {
        let response = self
            .api
            .create_video(&CreateVideoRequest {
                replica_id: request.replica_id.clone(),
                script: request.script.clone(),
                background: None,
                properties: None,
            })
            .await?;
        Ok(CreatedJob {
            id: response.video_id,
            status: JobStatus::Queued.advance(JobStatus::from_service(&response.status)),
            created_at: response.created_at.unwrap_or_else(Utc::now),
        })
    }

    async fn query(&self, job_id: &str) -> RemoteResult<JobReport> {
        Ok(report_from(self.api.get_video(job_id).await?))
    }

    async fn delete(&self, job_id: &str) -> RemoteResult<()> {
        self.api.delete_video(job_id).await
    }
}

// ============================================================================
// Simulated
// ============================================================================

/// Network-free backend with a fixed lifecycle: the first
/// `SIMULATED_GENERATING_POLLS` queries report `generating`, every later one
/// reports `completed` with the canned result.
#[derive(Default)]
pub struct SimulatedJobBackend {
    attempts: Mutex<HashMap<String, u32>>,
}

impl SimulatedJobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn attempts(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn canned_result() -> JobResult {
        JobResult {
            video_url: SIMULATED_VIDEO_URL.to_string(),
            thumbnail_url: Some(SIMULATED_THUMBNAIL_URL.to_string()),
            duration_secs: Some(SIMULATED_DURATION_SECS),
        }
    }
}

#[async_trait]
impl JobBackend for SimulatedJobBackend {
    fn mode(&self) -> JobMode {
        JobMode::Simulated
    }

    async fn create(&self, _request: &CreateJobRequest) -> RemoteResult<CreatedJob> {
        let id = format!("sim-{}", Uuid::new_v4());
        self.attempts().insert(id.clone(), 0);
        Ok(CreatedJob {
            id,
            status: JobStatus::Queued,
            created_at: Utc::now(),
        })
    }

    async fn query(&self, job_id: &str) -> RemoteResult<JobReport> {
        let mut attempts = self.attempts();
        let counter = attempts.get_mut(job_id).ok_or_else(|| {
            RemoteError::new(
                ErrorCategory::NotFound,
                format!("simulated job {} not found", job_id),
            )
        })?;
        let attempt = *counter;
        *counter += 1;

        let report = if attempt < SIMULATED_GENERATING_POLLS {
            JobReport {
                status: JobStatus::Generating,
                result: None,
                attempt: Some(*counter),
            }
        } else {
            JobReport {
                status: JobStatus::Completed,
                result: Some(Self::canned_result()),
                attempt: Some(*counter),
            }
        };
        Ok(report)
    }

    async fn delete(&self, job_id: &str) -> RemoteResult<()> {
        self.attempts().remove(job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::MockVideoApi;

    fn request() -> CreateJobRequest {
        CreateJobRequest {
            script: "Hello there".into(),
            replica_id: "r-1".into(),
        }
    }

    #[tokio::test]
    async fn test_simulated_schedule() {
        let backend = SimulatedJobBackend::new();
        let created = backend.create(&request()).await.unwrap();
        assert_eq!(created.status, JobStatus::Queued);

        for expected_attempt in 1..=3 {
            let report = backend.query(&created.id).await.unwrap();
            assert_eq!(report.status, JobStatus::Generating);
            assert_eq!(report.attempt, Some(expected_attempt));
        }
        let report = backend.query(&created.id).await.unwrap();
        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.result.unwrap().video_url, SIMULATED_VIDEO_URL);
    }

    #[tokio::test]
    async fn test_simulated_unknown_job() {
        let backend = SimulatedJobBackend::new();
        let err = backend.query("nope").await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_remote_maps_ready_report() {
        let api = Arc::new(MockVideoApi::new().then_ready("https://cdn.example.com/v.mp4"));
        let backend = RemoteJobBackend::new(api);
        let created = backend.create(&request()).await.unwrap();
        assert_eq!(created.status, JobStatus::Queued);

        let report = backend.query(&created.id).await.unwrap();
        assert_eq!(report.status, JobStatus::Completed);
        let result = report.result.unwrap();
        assert_eq!(result.video_url, "https://cdn.example.com/v.mp4");
        assert_eq!(result.duration_secs, Some(8.0));
        assert_eq!(report.attempt, None);
    }
}
