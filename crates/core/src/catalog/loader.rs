//! # Catalog Loader
//!
//! Fetches the catalog document from its configured source. No retries and
//! no partial results: a load either yields a whole `Catalog` or a
//! `LoadError`.

use super::model::Catalog;
use super::source::CatalogSource;
use crate::error::LoadError;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can produce a catalog for a source
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self, source: &CatalogSource) -> Result<Catalog, LoadError>;
}

/// Default fetcher: `tokio::fs` for files, `reqwest` for URLs
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    client: reqwest::Client,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every remote fetch by `timeout`. A request that runs past it
    /// fails as `LoadError::Http`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogFetcher for CatalogLoader {
    async fn fetch(&self, source: &CatalogSource) -> Result<Catalog, LoadError> {
        let body = match source {
            CatalogSource::Remote(url) => self.fetch_remote(url).await?,
            CatalogSource::Local(path) | CatalogSource::Bundled(path) => {
                tokio::fs::read_to_string(path).await?
            }
        };

        let catalog = Catalog::from_json(&body)?;
        tracing::debug!(
            source = %source,
            materials = catalog.materials.len(),
            "Catalog fetched"
        );
        Ok(catalog)
    }
}
