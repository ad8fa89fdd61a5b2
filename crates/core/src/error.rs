//! # Load Errors
//!
//! Typed failures for catalog loading. Every variant collapses to the same
//! user-facing message; the detail only ever reaches the logs.

use thiserror::Error;

/// Message shown in the display region whenever a catalog load fails.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load materials. Please try again later.";

/// Why a catalog could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    /// Local or bundled file could not be read
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// Remote fetch failed before a response arrived
    #[error("failed to fetch catalog: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote responded with a non-success status
    #[error("catalog request returned HTTP {0}")]
    Status(u16),
    /// Body was not a valid catalog document
    #[error("catalog body is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl LoadError {
    /// The fixed generic message for the user.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }
}
