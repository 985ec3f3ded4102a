//! Normalized failure shape for every remote call

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Network,
    /// 401 / 403
    Unauthorized,
    /// 404
    NotFound,
    /// Any other 4xx: the backend understood and refused the request.
    Rejected,
    /// 5xx
    Server,
    /// A response arrived but its body could not be decoded.
    Decode,
}

impl ErrorCategory {
    /// Map an HTTP status code onto a category.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400..=499 => Self::Rejected,
            _ => Self::Server,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Rejected => "rejected",
            Self::Server => "server",
            Self::Decode => "decode",
        };
        f.write_str(s)
    }
}

/// Single error shape returned by every `BackendApi` / `VideoApi` method.
///
/// Carries the category, the HTTP status when one was received, and a
/// human-readable message. Clients never retry on their own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct RemoteError {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            status: None,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Decode, message)
    }

    /// Build from a non-success HTTP status and the raw response body.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::from_status(status),
            status: Some(status),
            message: body.into(),
        }
    }

    /// True when the service could not be reached at all.
    pub fn is_transport(&self) -> bool {
        self.category == ErrorCategory::Network
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::network(err.to_string()),
        }
    }
}
