//! Job polling engine
//!
//! Owns exactly one generation job. The engine is a pull state machine: it
//! never schedules anything itself, callers (usually `PollScheduler`) decide
//! when to call `poll_status`.

use super::backend::{JobBackend, SimulatedJobBackend};
use super::models::*;
use crate::error::{Result, SyncError};
use crate::events::{EventEmitter, SyncEvent};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct JobPollingEngine {
    backend: Arc<dyn JobBackend>,
    /// Used once if the primary backend is unreachable at creation
    fallback: Option<Arc<dyn JobBackend>>,
    job: Option<VideoJob>,
    cancel: CancellationToken,
    emitter: Option<Arc<dyn EventEmitter>>,
}

impl JobPollingEngine {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self {
            backend,
            fallback: None,
            job: None,
            cancel: CancellationToken::new(),
            emitter: None,
        }
    }

    /// Engine running entirely on the simulated backend
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedJobBackend::new()))
    }

    /// Backend to switch to when creation fails with a transport error
    pub fn with_fallback(mut self, fallback: Arc<dyn JobBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Mode of the backend currently in use
    pub fn mode(&self) -> JobMode {
        self.backend.mode()
    }

    /// Current job snapshot, if one was created
    pub fn job(&self) -> Option<&VideoJob> {
        self.job.as_ref()
    }

    /// Stop polling. Later `poll_status` calls return the last snapshot.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn emit(&self, job: &VideoJob) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(SyncEvent::JobUpdated {
                job_id: job.id.clone(),
                status: job.status,
            });
        }
    }

    /// Create the job this engine owns.
    ///
    /// Fails with `JobCreation` if the engine already owns a job or the
    /// backend refuses; no job is recorded in that case.
    pub async fn create_job(&mut self, script: &str, replica_id: &str) -> Result<VideoJob> {
        if let Some(existing) = &self.job {
            return Err(SyncError::JobCreation(format!(
                "engine already owns job {}",
                existing.id
            )));
        }
        let script = script.trim();
        let replica_id = replica_id.trim();
        if script.is_empty() {
            return Err(SyncError::validation("script cannot be empty"));
        }
        if replica_id.is_empty() {
            return Err(SyncError::validation("replica id cannot be empty"));
        }

        let request = CreateJobRequest {
            script: script.to_string(),
            replica_id: replica_id.to_string(),
        };

        let outcome = self.backend.create(&request).await;
        let created = match outcome {
            Ok(created) => created,
            Err(err) if err.is_transport() && self.fallback.is_some() => {
                warn!("Video service unreachable, switching to simulated mode: {}", err);
                if let Some(fallback) = self.fallback.take() {
                    self.backend = fallback;
                }
                self.backend
                    .create(&request)
                    .await
                    .map_err(|e| SyncError::JobCreation(e.to_string()))?
            }
            Err(err) => {
                warn!("Job creation failed: {}", err);
                return Err(SyncError::JobCreation(err.to_string()));
            }
        };

        let job = VideoJob {
            id: created.id,
            script: request.script,
            replica_id: request.replica_id,
            status: created.status,
            result: None,
            attempts: 0,
            created_at: created.created_at,
            updated_at: created.created_at,
            mode: self.backend.mode(),
        };
        info!(job_id = %job.id, mode = ?job.mode, "Video job created");
        self.emit(&job);
        self.job = Some(job.clone());
        Ok(job)
    }

    /// Observe the job's current status.
    ///
    /// Terminal and cancelled jobs return their snapshot without a backend
    /// call. A transport failure returns `Fetch` and leaves the job as it was;
    /// any other remote error marks the job `Failed`.
    pub async fn poll_status(&mut self) -> Result<VideoJob> {
        let (job_id, current) = match &self.job {
            Some(job) => (job.id.clone(), job.status),
            None => return Err(SyncError::validation("no job to poll")),
        };
        if current.is_terminal() || self.cancel.is_cancelled() {
            return self
                .job
                .clone()
                .ok_or_else(|| SyncError::validation("no job to poll"));
        }

        let report = match self.backend.query(&job_id).await {
            Ok(report) => report,
            Err(err) if err.is_transport() => {
                warn!(%job_id, "Status poll failed: {}", err);
                return Err(err.into());
            }
            Err(err) => {
                // The service answered; the job cannot be observed any more
                warn!(%job_id, "Status poll rejected, marking job failed: {}", err);
                JobReport {
                    status: JobStatus::Failed,
                    result: None,
                    attempt: None,
                }
            }
        };

        let Some(job) = self.job.as_mut() else {
            return Err(SyncError::validation("no job to poll"));
        };
        let next = job.status.advance(report.status);
        if next != report.status {
            debug!(%job_id, current = %job.status, reported = %report.status, "Ignoring backward status report");
        }
        if let Some(attempt) = report.attempt {
            job.attempts = attempt;
        }
        let changed = next != job.status;
        if changed {
            job.status = next;
            if next == JobStatus::Completed {
                job.result = report.result;
            }
        }
        job.updated_at = Utc::now();
        let snapshot = job.clone();

        debug!(%job_id, status = %snapshot.status, attempts = snapshot.attempts, "Job polled");
        if changed {
            if snapshot.status.is_terminal() {
                info!(%job_id, status = %snapshot.status, "Video job finished");
            }
            self.emit(&snapshot);
        }
        Ok(snapshot)
    }

    /// Delete the job on its backend and consume the engine.
    pub async fn delete_job(self) -> Result<()> {
        if let Some(job) = &self.job {
            self.backend.delete(&job.id).await?;
            info!(job_id = %job.id, "Video job deleted");
        }
        Ok(())
    }
}
