//! # Host Bridge
//!
//! The boundary with an external host runtime.
//!
//! ```text
//! Host                                 MaterialLibrary
//!  │── BridgeCommand::Refresh ─────────▶ │ reload catalog
//!  │── BridgeCommand::Upsert ──────────▶ │ replace-or-append one material
//!  │── BridgeCommand::Notify ──────────▶ │ transient notification
//!  │ ◀──── MaterialHost::apply_material ─┤ user clicked "apply"
//! ```
//!
//! Every call is fire-and-forget. A missing host is a supported
//! configuration: apply actions are then simulated locally.

use serde::{Deserialize, Serialize};
#[cfg(test)]
use std::sync::Mutex;

/// Capability implemented by the host to receive apply actions
pub trait MaterialHost: Send + Sync {
    /// Receive a material serialized as JSON. Must not block.
    fn apply_material(&self, material_json: &str);
}

/// Inbound command from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeCommand {
    /// Reload the catalog from its source
    Refresh,
    /// Replace or append one material, given as JSON text
    Upsert { material_json: String },
    /// Show a transient notification; `kind` is `success` or `error`
    Notify {
        message: String,
        #[serde(default)]
        kind: String,
    },
}

/// Host that records every payload it receives
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHost {
    received: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads received so far, oldest first.
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl MaterialHost for RecordingHost {
    fn apply_material(&self, material_json: &str) {
        if let Ok(mut received) = self.received.lock() {
            received.push(material_json.to_string());
        }
    }
}
