//! Video generation jobs
//!
//! Architecture follows the crate pattern (trait + impls):
//! - `JobBackend` trait: create / query / delete a job
//! - `RemoteJobBackend`: the external video service
//! - `SimulatedJobBackend`: deterministic, network-free fallback
//! - `JobPollingEngine`: pull state machine owning one job
//! - `PollScheduler`: interval + cancellation driver around the engine

pub mod backend;
pub mod engine;
pub mod models;
pub mod scheduler;

pub use backend::{JobBackend, RemoteJobBackend, SimulatedJobBackend};
pub use engine::JobPollingEngine;
pub use models::{JobMode, JobResult, JobStatus, VideoJob};
pub use scheduler::PollScheduler;
