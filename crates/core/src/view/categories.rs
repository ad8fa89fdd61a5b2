//! # Categories
//!
//! Top-level material categories recognised by the filter bar, in display
//! order. Tags outside this list are searchable but never get a control.

use crate::catalog::Material;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A recognised top-level category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Tag value as stored on materials
    pub tag: &'static str,
    /// Label shown on the filter control
    pub label: &'static str,
}

/// The allow-list, in filter-bar order.
pub const CATEGORIES: &[Category] = &[
    Category { tag: "kayu", label: "Kayu" },
    Category { tag: "batu", label: "Batu" },
    Category { tag: "batik", label: "Batik" },
    Category { tag: "keramik", label: "Keramik" },
    Category { tag: "logam", label: "Logam" },
    Category { tag: "kain", label: "Kain" },
    Category { tag: "rotan", label: "Rotan" },
    Category { tag: "bambu", label: "Bambu" },
];

/// Allow-listed categories that at least one material carries, in
/// allow-list order.
pub fn available_categories(materials: &[Material]) -> Vec<Category> {
    let present: HashSet<&str> = materials
        .iter()
        .flat_map(|m| m.tags.iter().map(String::as_str))
        .collect();

    CATEGORIES
        .iter()
        .filter(|c| present.contains(c.tag))
        .copied()
        .collect()
}

/// The active category filter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Tag(String),
}

impl CategoryFilter {
    /// Textual value used by the filter controls.
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Tag(tag) => tag,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "all" | "" => Self::All,
            tag => Self::Tag(tag.to_string()),
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
