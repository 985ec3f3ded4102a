//! PromptShare Sync
//!
//! Client-side reconciliation core of the PromptShare app:
//! - Optimistic comments and likes that roll back exactly on failure
//! - A polling state machine for AI video generation jobs, with a
//!   simulated fallback when the video service is absent
//! - A broadcast bus of reconciled-state events for observers

pub mod error;
pub mod events;
pub mod jobs;
pub mod remote;
pub mod social;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::SyncError;

use anyhow::{Context, Result};
use events::EventBus;
use jobs::{JobPollingEngine, PollScheduler, RemoteJobBackend, SimulatedJobBackend};
use remote::{BackendApi, HttpVideoApi, RestBackend, VideoApi, DEFAULT_VIDEO_API_URL};
use serde::Deserialize;
use social::{NotificationFeed, OptimisticStore, StoreConfig, Viewer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub backend: BackendYamlConfig,
    pub video: VideoYamlConfig,
    pub polling: PollingYamlConfig,
    pub comments: CommentsYamlConfig,
}

/// Backend (PostgREST) section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendYamlConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl Default for BackendYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".into(),
            anon_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Video generation service section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoYamlConfig {
    pub url: String,
    /// No key means every job runs in simulated mode
    pub api_key: Option<String>,
    pub replica_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VideoYamlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_VIDEO_API_URL.into(),
            api_key: None,
            replica_id: None,
            timeout_secs: 30,
        }
    }
}

/// Job polling section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingYamlConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub max_consecutive_errors: u32,
}

impl Default for PollingYamlConfig {
    fn default() -> Self {
        Self {
            interval_ms: jobs::scheduler::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            max_attempts: jobs::scheduler::DEFAULT_MAX_POLLS,
            max_consecutive_errors: jobs::scheduler::DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}

/// Comments section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentsYamlConfig {
    pub max_length: usize,
}

impl Default for CommentsYamlConfig {
    fn default() -> Self {
        Self {
            max_length: social::DEFAULT_MAX_COMMENT_LENGTH,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_anon_key: String,
    pub backend_timeout: Duration,
    pub video_api_url: String,
    pub video_api_key: Option<String>,
    pub video_replica_id: Option<String>,
    pub video_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub poll_max_consecutive_errors: u32,
    pub comment_max_length: usize,
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file
    /// falls back to env vars / defaults; an unreadable one is an error.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path)?;

        Ok(Self {
            backend_url: std::env::var("BACKEND_URL").unwrap_or(yaml.backend.url),
            backend_anon_key: std::env::var("BACKEND_ANON_KEY").unwrap_or(yaml.backend.anon_key),
            backend_timeout: Duration::from_secs(yaml.backend.timeout_secs),
            video_api_url: std::env::var("VIDEO_API_URL").unwrap_or(yaml.video.url),
            video_api_key: non_empty(std::env::var("VIDEO_API_KEY").ok().or(yaml.video.api_key)),
            video_replica_id: non_empty(
                std::env::var("VIDEO_REPLICA_ID")
                    .ok()
                    .or(yaml.video.replica_id),
            ),
            video_timeout: Duration::from_secs(yaml.video.timeout_secs),
            poll_interval: Duration::from_millis(
                env_parse("POLL_INTERVAL_MS").unwrap_or(yaml.polling.interval_ms),
            ),
            poll_max_attempts: env_parse("POLL_MAX_ATTEMPTS").unwrap_or(yaml.polling.max_attempts),
            poll_max_consecutive_errors: yaml.polling.max_consecutive_errors,
            comment_max_length: env_parse("COMMENT_MAX_LENGTH")
                .unwrap_or(yaml.comments.max_length),
        })
    }

    fn load_yaml(yaml_path: Option<&Path>) -> Result<YamlConfig> {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Ok(YamlConfig::default())
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", path.display()))),
        }
    }

    /// True when no video API key is configured and jobs run simulated
    pub fn simulated_video(&self) -> bool {
        self.video_api_key.is_none()
    }
}

// ============================================================================
// Services
// ============================================================================

/// Explicitly constructed clients shared by the store, feed and engine
#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn BackendApi>,
    /// `None` when no video API key is configured
    pub video: Option<Arc<dyn VideoApi>>,
    pub events: EventBus,
    pub config: Arc<Config>,
}

impl Services {
    /// Build HTTP clients from `config`. `access_token` is the signed-in
    /// viewer's session token, if any.
    pub fn new(config: Config, access_token: Option<String>) -> Result<Self> {
        let mut rest = RestBackend::new(
            &config.backend_url,
            &config.backend_anon_key,
            config.backend_timeout,
        )
        .context("Failed to build backend client")?;
        if let Some(token) = access_token {
            rest = rest.with_access_token(token);
        }

        let video: Option<Arc<dyn VideoApi>> = match &config.video_api_key {
            Some(key) => Some(Arc::new(
                HttpVideoApi::new(&config.video_api_url, key, config.video_timeout)
                    .context("Failed to build video client")?,
            )),
            None => {
                tracing::info!("No video API key configured, jobs run in simulated mode");
                None
            }
        };

        Ok(Self::with_clients(config, Arc::new(rest), video))
    }

    /// Wire pre-built clients (used by tests with the in-memory mocks)
    pub fn with_clients(
        config: Config,
        backend: Arc<dyn BackendApi>,
        video: Option<Arc<dyn VideoApi>>,
    ) -> Self {
        Self {
            backend,
            video,
            events: EventBus::default(),
            config: Arc::new(config),
        }
    }

    /// A fresh comment store for one screen
    pub fn comment_store(&self, viewer: Option<Viewer>) -> OptimisticStore {
        OptimisticStore::new(self.backend.clone(), viewer)
            .with_config(StoreConfig {
                max_comment_length: self.config.comment_max_length,
            })
            .with_emitter(Arc::new(self.events.clone()))
    }

    pub fn notification_feed(&self) -> NotificationFeed {
        NotificationFeed::new(self.backend.clone())
    }

    /// A fresh engine for one job: remote with a simulated fallback when a
    /// video client exists, simulated otherwise.
    pub fn job_engine(&self) -> JobPollingEngine {
        let engine = match &self.video {
            Some(api) => JobPollingEngine::new(Arc::new(RemoteJobBackend::new(api.clone())))
                .with_fallback(Arc::new(SimulatedJobBackend::new())),
            None => JobPollingEngine::simulated(),
        };
        engine.with_emitter(Arc::new(self.events.clone()))
    }

    pub fn poll_scheduler(&self) -> PollScheduler {
        PollScheduler::new(self.config.poll_interval)
            .with_max_polls(self.config.poll_max_attempts)
            .with_max_consecutive_errors(self.config.poll_max_consecutive_errors)
    }
}

// ============================================================================
// Tests
// ============================================================================
