//! # Catalog
//!
//! The material catalog document, where it comes from, and how it is
//! fetched.
//!
//! - `model` - `Material` / `Catalog` wire types
//! - `source` - configured catalog location
//! - `loader` - `CatalogFetcher` trait and the default `CatalogLoader`

pub mod loader;
pub mod model;
pub mod source;

pub use loader::{CatalogFetcher, CatalogLoader};
pub use model::{derive_boards, parse_sync_time, Catalog, Material};
pub use source::CatalogSource;
