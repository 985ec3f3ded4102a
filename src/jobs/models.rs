//! Video generation job models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a generation job.
///
/// Moves monotonically `Queued → Generating → Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Generating,
    Completed,
    Failed,
}

impl JobStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Generating => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The status after observing `reported`.
    ///
    /// Terminal statuses never change, and a report that would move the job
    /// backward is ignored.
    pub fn advance(self, reported: JobStatus) -> JobStatus {
        if self.is_terminal() || reported.rank() < self.rank() {
            self
        } else {
            reported
        }
    }

    /// Map a status string as spelled by the video service.
    ///
    /// Anything unrecognized (including explicit error states) is `Failed`.
    pub fn from_service(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" => Self::Queued,
            "generating" | "processing" | "started" | "in_progress" => Self::Generating,
            "ready" | "completed" | "done" => Self::Completed,
            _ => Self::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend a job lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    Remote,
    Simulated,
}

/// Playable output of a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<f64>,
}

/// Snapshot of one generation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoJob {
    /// Service-assigned video id
    pub id: String,
    pub script: String,
    pub replica_id: String,
    pub status: JobStatus,
    pub result: Option<JobResult>,
    /// Polls answered by the simulated backend; stays 0 in remote mode
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub mode: JobMode,
}

/// Input of a job creation
#[derive(Debug, Clone, PartialEq)]
pub struct CreateJobRequest {
    pub script: String,
    pub replica_id: String,
}

/// What a backend returns when a job was created
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedJob {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// One status observation from a backend
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub status: JobStatus,
    pub result: Option<JobResult>,
    /// Simulated attempt count after this observation
    pub attempt: Option<u32>,
}
