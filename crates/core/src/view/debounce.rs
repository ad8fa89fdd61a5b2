//! # Debounce
//!
//! Cancel-and-reschedule coalescing for rapid input. The caller supplies
//! the clock, so nothing here sleeps or spawns.

use std::time::{Duration, Instant};

/// Delay between the last keystroke and the search being applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds at most one pending value and the instant it becomes due
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.deadline()?;
        if now < due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value without applying it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}
