//! # Filtering
//!
//! The derived view: category filter first, then free-text search. Both are
//! stable (source order is preserved) and the result is always rebuilt from
//! scratch.

use super::categories::CategoryFilter;
use crate::catalog::Material;

/// Derive the visible materials from the full list.
pub fn filter_materials(
    materials: &[Material],
    filter: &CategoryFilter,
    query: &str,
) -> Vec<Material> {
    let needle = query.trim().to_lowercase();

    materials
        .iter()
        .filter(|m| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Tag(tag) => m.has_tag(tag),
        })
        .filter(|m| needle.is_empty() || m.matches_query(&needle))
        .cloned()
        .collect()
}
