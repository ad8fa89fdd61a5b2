//! # Materia Core
//!
//! State management for a browsable material catalog: loading, filtering,
//! search, rendering, and the bridge to an embedding host.
//!
//! ## Architecture
//!
//! - `catalog/` - Catalog document model, source resolution, and fetching
//! - `view/` - View controller, filter/search, debounce, notifications, HTML rendering
//! - `bridge` - Host command and apply-callback contract
//! - `library` - Async service that owns the view and broadcasts events
//! - `config` - Persisted configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use materia_core::{CatalogLoader, LibraryConfig, MaterialLibrary};
//! use std::sync::Arc;
//!
//! let config = LibraryConfig::load(".materia/config.json").await?;
//! let library = Arc::new(MaterialLibrary::new(
//!     Arc::new(CatalogLoader::new()),
//!     config.source(),
//!     None,
//! ));
//! library.load().await;
//! println!("{}", library.render_text().await);
//! ```

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod view;

pub use bridge::{BridgeCommand, MaterialHost};
pub use catalog::{Catalog, CatalogFetcher, CatalogLoader, CatalogSource, Material};
pub use config::LibraryConfig;
pub use error::LoadError;
pub use library::MaterialLibrary;
