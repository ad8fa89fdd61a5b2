//! # Catalog Model
//!
//! The JSON document written by the board sync job and the materials inside
//! it. Everything except a material's `id` is optional on the wire.

use crate::error::LoadError;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Material {
    /// Stable identifier (e.g. `pin_123456`)
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub source_url: String,
    /// Lowercase category strings, in source order
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Name of the board the material was collected from
    #[serde(default)]
    pub board: String,
}

impl Material {
    /// Exact, case-sensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match over title, description, tags and
    /// board. `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
            || self.board.to_lowercase().contains(needle)
    }

    /// Parse a single material from a bridge payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// JSON payload handed to the host, in the catalog wire format.
    pub fn to_payload(&self) -> String {
        // Plain string fields only, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The fetched catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub materials: Vec<Material>,
    /// Board names; derived from the materials when the document omits them
    #[serde(default, deserialize_with = "null_as_default")]
    pub boards: Vec<String>,
    #[serde(default)]
    pub last_sync: Option<String>,
}

impl Catalog {
    /// Parse a catalog body.
    pub fn from_json(body: &str) -> Result<Self, LoadError> {
        let mut catalog: Catalog = serde_json::from_str(body)?;
        if catalog.boards.is_empty() {
            catalog.boards = derive_boards(&catalog.materials);
        }
        Ok(catalog)
    }
}

/// Sorted distinct board names of the given materials.
pub fn derive_boards(materials: &[Material]) -> Vec<String> {
    materials
        .iter()
        .filter(|m| !m.board.is_empty())
        .map(|m| m.board.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a sync timestamp.
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` form the
/// sync job writes. The offset, when present, is dropped: the timestamp is
/// shown as the wall-clock time it was recorded in.
pub fn parse_sync_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_materials_defaults_to_empty() {
        let catalog = Catalog::from_json(r#"{"last_sync": null}"#).unwrap();
        assert!(catalog.materials.is_empty());
        assert!(catalog.last_sync.is_none());
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let catalog =
            Catalog::from_json(r#"{"materials": null, "boards": null, "last_sync": null}"#)
                .unwrap();
        assert!(catalog.materials.is_empty());
        assert!(catalog.boards.is_empty());

        let catalog =
            Catalog::from_json(r#"{"materials": [{"id": "pin_1", "tags": null}]}"#).unwrap();
        assert!(catalog.materials[0].tags.is_empty());
    }

    #[test]
    fn test_payload_matches_wire_model() {
        let material = Material {
            id: "pin_1".into(),
            title: "Teak \"Panel\"".into(),
            description: "Reclaimed".into(),
            image_url: "https://img.test/teak.jpg".into(),
            source_url: "https://pin.test/1".into(),
            tags: vec!["kayu".into(), "natural".into()],
            board: "Wood".into(),
        };
        let payload = material.to_payload();
        assert_eq!(Material::from_json(&payload).unwrap(), material);

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 7);
        assert_eq!(value["tags"][1], "natural");
    }

    #[test]
    fn test_material_optional_fields_default() {
        let catalog = Catalog::from_json(r#"{"materials": [{"id": "pin_1"}]}"#).unwrap();
        let material = &catalog.materials[0];
        assert_eq!(material.id, "pin_1");
        assert!(material.title.is_empty());
        assert!(material.tags.is_empty());
    }

    #[test]
    fn test_material_without_id_is_malformed() {
        let err = Catalog::from_json(r#"{"materials": [{"title": "no id"}]}"#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn test_boards_derived_when_absent() {
        let catalog = Catalog::from_json(
            r#"{"materials": [
                {"id": "a", "board": "Wood"},
                {"id": "b", "board": "Stone"},
                {"id": "c", "board": "Wood"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(catalog.boards, vec!["Stone".to_string(), "Wood".to_string()]);
    }

    #[test]
    fn test_declared_boards_are_kept() {
        let catalog =
            Catalog::from_json(r#"{"materials": [{"id": "a", "board": "Wood"}], "boards": ["X"]}"#)
                .unwrap();
        assert_eq!(catalog.boards, vec!["X".to_string()]);
    }

    #[test]
    fn test_matches_query_covers_all_fields() {
        let material = Material {
            id: "a".into(),
            title: "Teak Panel".into(),
            description: "Reclaimed".into(),
            image_url: String::new(),
            source_url: String::new(),
            tags: vec!["kayu".into()],
            board: "Interior".into(),
        };
        assert!(material.matches_query("teak"));
        assert!(material.matches_query("reclaim"));
        assert!(material.matches_query("kay"));
        assert!(material.matches_query("interior"));
        assert!(!material.matches_query("marble"));
    }

    #[test]
    fn test_parse_sync_time_formats() {
        let naive = parse_sync_time("2025-01-15T10:30:00.123456").unwrap();
        assert_eq!(naive.format("%H:%M").to_string(), "10:30");

        let rfc = parse_sync_time("2025-01-15T10:30:00+07:00").unwrap();
        assert_eq!(rfc.format("%d %b %Y").to_string(), "15 Jan 2025");

        assert!(parse_sync_time("yesterday").is_none());
    }
}
