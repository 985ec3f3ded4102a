//! Viewer notification feed

use super::models::Notification;
use super::store::LoadState;
use crate::error::Result;
use crate::remote::BackendApi;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

#[derive(Debug)]
struct FeedState {
    load: LoadState,
    items: Vec<Notification>,
}

/// Notifications of the signed-in viewer, newest first.
///
/// A failed refresh keeps the previously loaded items and moves the feed to
/// `LoadState::Failed`, so an empty feed always means "nothing to show".
pub struct NotificationFeed {
    backend: Arc<dyn BackendApi>,
    state: Mutex<FeedState>,
}

impl NotificationFeed {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            state: Mutex::new(FeedState {
                load: LoadState::Idle,
                items: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reload the feed from the backend
    pub async fn refresh(&self) -> Result<Vec<Notification>> {
        self.lock().load = LoadState::Loading;

        match self.backend.get_notifications().await {
            Ok(rows) => {
                let mut items: Vec<Notification> = rows.into_iter().map(Notification::from).collect();
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                let mut state = self.lock();
                state.items = items.clone();
                state.load = LoadState::Loaded;
                debug!(count = items.len(), "Notifications loaded");
                Ok(items)
            }
            Err(err) => {
                self.lock().load = LoadState::Failed(err.to_string());
                warn!("Failed to load notifications: {}", err);
                Err(err.into())
            }
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().load.clone()
    }
}
