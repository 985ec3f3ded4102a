//! Remote client façade
//!
//! Typed access to the two external surfaces this crate consumes. Follows the
//! trait + impl + mock pattern:
//! - `BackendApi` / `RestBackend`: comments, likes and notifications over PostgREST
//! - `VideoApi` / `HttpVideoApi`: the video-generation REST service
//! - `MockBackend` / `MockVideoApi`: in-memory doubles with failure injection
//!
//! No business logic lives here. Every failure is normalized into
//! [`RemoteError`] and nothing is retried.

pub mod error;
pub mod mock;
pub mod models;
mod rest;
pub mod traits;
mod video;

pub use error::{ErrorCategory, RemoteError};
pub use rest::RestBackend;
pub use traits::{BackendApi, RemoteResult, VideoApi};
pub use video::{HttpVideoApi, DEFAULT_VIDEO_API_URL};
