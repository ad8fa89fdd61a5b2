//! # Library Configuration
//!
//! Settings persisted in `.materia/config.json`. Every field is optional;
//! accessors supply defaults. CLI flags are layered on top with `merge`.

use crate::catalog::CatalogSource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = ".materia/config.json";
pub const DEFAULT_CATALOG_SOURCE: &str = "data/library.json";
pub const DEFAULT_BUNDLE_DIR: &str = "data";
pub const DEFAULT_TITLE: &str = "Material Library";
pub const DEFAULT_PORT: u16 = 8080;

/// Persisted library configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path or http(s) URL of the catalog document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_source: Option<String>,
    /// Directory that bare catalog filenames resolve into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_dir: Option<String>,
    /// URL that receives apply payloads; unset means simulated apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl LibraryConfig {
    /// Read the config at `path`. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config: {:?}", path))
    }

    /// Overlay every field set in `other`.
    pub fn merge(&mut self, other: LibraryConfig) {
        if other.catalog_source.is_some() {
            self.catalog_source = other.catalog_source;
        }
        if other.bundle_dir.is_some() {
            self.bundle_dir = other.bundle_dir;
        }
        if other.host_webhook.is_some() {
            self.host_webhook = other.host_webhook;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
    }

    pub fn catalog_source(&self) -> &str {
        self.catalog_source
            .as_deref()
            .unwrap_or(DEFAULT_CATALOG_SOURCE)
    }

    pub fn bundle_dir(&self) -> PathBuf {
        PathBuf::from(self.bundle_dir.as_deref().unwrap_or(DEFAULT_BUNDLE_DIR))
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Resolved catalog location.
    pub fn source(&self) -> CatalogSource {
        CatalogSource::resolve(self.catalog_source(), &self.bundle_dir())
    }
}
