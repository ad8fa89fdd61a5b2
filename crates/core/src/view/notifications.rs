//! # Notifications
//!
//! Transient toasts. Each one carries its own expiry and is removed by a
//! sweep; there is no queue and no throttling.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Lenient parse for bridge input; anything unrecognised is a success.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "success" => Self::Success,
            other => {
                tracing::debug!(kind = %other, "Unknown notification kind, using success");
                Self::Success
            }
        }
    }
}

/// One visible notification
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip)]
    pub expires_at: Instant,
}

/// Ordered stack of active notifications
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: u64,
    active: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification expiring `NOTIFICATION_TTL` after `now`.
    pub fn push(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.active.push(Notification {
            id,
            message: message.into(),
            kind,
            expires_at: now + NOTIFICATION_TTL,
        });
        id
    }

    /// Remove expired notifications; returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| n.expires_at > now);
        before - self.active.len()
    }

    /// Active notifications, oldest first.
    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
