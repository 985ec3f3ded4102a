//! Interval driver for `JobPollingEngine`
//!
//! Sleeps `interval` between polls until the job is terminal, the token is
//! cancelled, `max_polls` is reached, or too many transport failures happen
//! in a row.

use super::engine::JobPollingEngine;
use super::models::VideoJob;
use crate::error::{Result, SyncError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_POLLS: u32 = 120;
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
    max_polls: u32,
    max_consecutive_errors: u32,
    cancel: CancellationToken,
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_polls: DEFAULT_MAX_POLLS,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max.max(1);
        self
    }

    /// Drive with an externally owned token, e.g. a child of a screen's token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `engine` until it settles, calling `on_update` with every
    /// successful snapshot.
    ///
    /// Returns the last known snapshot when the job is terminal, when either
    /// this scheduler's or the engine's token is cancelled, or when
    /// `max_polls` is exhausted. Returns the last `Fetch` error once
    /// `max_consecutive_errors` polls failed in a row.
    pub async fn drive<F>(&self, engine: &mut JobPollingEngine, mut on_update: F) -> Result<VideoJob>
    where
        F: FnMut(&VideoJob),
    {
        let mut last = engine
            .job()
            .cloned()
            .ok_or_else(|| SyncError::validation("no job to poll"))?;
        let engine_cancel = engine.cancellation_token();
        let mut consecutive_errors = 0;

        for poll in 1..=self.max_polls {
            if last.status.is_terminal() {
                return Ok(last);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!(job_id = %last.id, "Polling cancelled");
                    return Ok(last);
                }
                _ = engine_cancel.cancelled() => {
                    info!(job_id = %last.id, "Polling cancelled by engine");
                    return Ok(last);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            match engine.poll_status().await {
                Ok(job) => {
                    consecutive_errors = 0;
                    on_update(&job);
                    last = job;
                }
                Err(err @ SyncError::Fetch(_)) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= self.max_consecutive_errors {
                        warn!(
                            job_id = %last.id,
                            "Giving up after {} consecutive poll failures: {}",
                            consecutive_errors, err
                        );
                        return Err(err);
                    }
                    warn!(job_id = %last.id, poll, "Transient poll failure, retrying: {}", err);
                }
                Err(err) => return Err(err),
            }
        }

        debug!(job_id = %last.id, status = %last.status, "Poll budget exhausted");
        Ok(last)
    }
}
