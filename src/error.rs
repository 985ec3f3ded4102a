//! Error taxonomy surfaced by the store and the job engine

use crate::remote::RemoteError;

/// Errors returned to callers of the social store and the job engine.
///
/// A business-level job failure is *not* an error: it is reported as a
/// `JobStatus::Failed` snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Bad input, rejected before any local state changed
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutation was attempted without a signed-in viewer
    #[error("sign in required")]
    AuthRequired,

    /// Network or backend failure on a read or write
    #[error("fetch failed: {0}")]
    Fetch(#[from] RemoteError),

    /// The external generation job could not be created
    #[error("job creation failed: {0}")]
    JobCreation(String),
}

impl SyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The underlying remote error, for `Fetch` failures
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
