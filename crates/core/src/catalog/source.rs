//! # Catalog Source
//!
//! Where the catalog document lives. Resolved once from configuration.

use std::fmt;
use std::path::{Path, PathBuf};

/// Location of the catalog document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Relative or absolute path on disk
    Local(PathBuf),
    /// Absolute `http(s)://` URL
    Remote(String),
    /// Bare filename shipped in the bundle directory
    Bundled(PathBuf),
}

impl CatalogSource {
    /// Resolve a configured location.
    ///
    /// URLs become `Remote`; anything with a path separator (or absolute)
    /// is `Local`; a bare filename is looked up in `bundle_dir`.
    pub fn resolve(raw: &str, bundle_dir: &Path) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::Remote(raw.to_string());
        }

        let path = Path::new(raw);
        if path.is_absolute() || raw.contains('/') || raw.contains(std::path::MAIN_SEPARATOR) {
            Self::Local(path.to_path_buf())
        } else {
            Self::Bundled(bundle_dir.join(raw))
        }
    }

    /// File path for local and bundled sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Local(path) | Self::Bundled(path) => Some(path),
            Self::Remote(_) => None,
        }
    }

    /// Whether a file-backed source exists. Remote sources are assumed
    /// reachable until fetched.
    pub fn exists(&self) -> bool {
        self.path().map(Path::exists).unwrap_or(true)
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
            Self::Bundled(path) => write!(f, "bundled:{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_variants() {
        let bundle = Path::new("data");

        assert_eq!(
            CatalogSource::resolve("https://example.com/library.json", bundle),
            CatalogSource::Remote("https://example.com/library.json".to_string())
        );
        assert_eq!(
            CatalogSource::resolve("data/library.json", bundle),
            CatalogSource::Local(PathBuf::from("data/library.json"))
        );
        assert_eq!(
            CatalogSource::resolve("library.json", bundle),
            CatalogSource::Bundled(PathBuf::from("data/library.json"))
        );
    }

    #[test]
    fn test_remote_has_no_path() {
        let source = CatalogSource::Remote("http://localhost/library.json".into());
        assert!(source.path().is_none());
        assert!(source.exists());
    }
}
