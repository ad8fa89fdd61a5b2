//! # View Events
//!
//! Facts about view-state changes, broadcast to subscribers (the server's
//! event stream).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of view event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewEventKind {
    /// A catalog load began
    LoadStarted,
    /// A catalog load replaced the materials
    LoadCompleted,
    /// A catalog load failed; materials untouched
    LoadFailed,
    /// Filter, search, or materials changed and the view was re-derived
    ViewUpdated,
    /// A notification was pushed or expired
    Notified,
    /// A material was handed to the host (or simulated)
    MaterialApplied,
}

/// An event emitted by the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewEvent {
    /// Monotonic event sequence within this process
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: ViewEventKind,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ViewEvent {
    /// Create a new event
    pub fn new(kind: ViewEventKind) -> Self {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        Self {
            seq: SEQ.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp: Utc::now(),
            kind,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
