//! Reconciled-state event system
//!
//! This module provides:
//! - `SyncEvent`: typed events emitted after the store or the job engine
//!   has applied a change to its snapshot
//! - `EventEmitter`: injectable sink trait
//! - `EventBus`: broadcast channel distributing events to observers

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{EventEmitter, SyncEvent};
