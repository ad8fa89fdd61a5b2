//! # View Controller
//!
//! Owns the view state and is the only way to change it. Every mutation
//! ends in `recompute`, so the filtered list is never stale.
//!
//! ```text
//!   Idle ──begin_load──▶ Loading ──finish_load(Ok)──▶ Loaded
//!                          │                            │
//!                          └──finish_load(Err)──▶ Error ┘──begin_load──▶ Loading
//! ```

use super::categories::{available_categories, Category, CategoryFilter};
use super::debounce::{Debouncer, SEARCH_DEBOUNCE};
use super::filter::filter_materials;
use super::notifications::{Notification, NotificationCenter, NotificationKind};
use crate::bridge::MaterialHost;
use crate::catalog::{derive_boards, Catalog, Material};
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Load lifecycle of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

impl LoadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
        }
    }
}

/// Handle for one load; only the newest ticket may finish a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What `finish_load` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Materials replaced
    Applied,
    /// Error placeholder shown, materials kept
    Failed,
    /// A newer load started since; result discarded
    Stale,
}

/// What `apply` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Payload handed to the host
    Delegated,
    /// No host configured; success notification shown
    Simulated,
    /// Unknown id; error notification shown
    NotFound,
}

impl ApplyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delegated => "delegated",
            Self::Simulated => "simulated",
            Self::NotFound => "not_found",
        }
    }
}

/// The catalog view state container
pub struct ViewController {
    materials: Vec<Material>,
    filtered: Vec<Material>,
    active_filter: CategoryFilter,
    search_query: String,
    categories: Vec<Category>,
    boards: Vec<String>,
    last_sync: Option<String>,
    phase: LoadPhase,
    is_loading: bool,
    generation: u64,
    search_input: Debouncer<String>,
    notifications: NotificationCenter,
    host: Option<Arc<dyn MaterialHost>>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ViewController {
    /// Create an empty controller. `host` receives apply actions; `None`
    /// means apply is simulated.
    pub fn new(host: Option<Arc<dyn MaterialHost>>) -> Self {
        Self {
            materials: Vec::new(),
            filtered: Vec::new(),
            active_filter: CategoryFilter::All,
            search_query: String::new(),
            categories: Vec::new(),
            boards: Vec::new(),
            last_sync: None,
            phase: LoadPhase::Idle,
            is_loading: false,
            generation: 0,
            search_input: Debouncer::new(SEARCH_DEBOUNCE),
            notifications: NotificationCenter::new(),
            host,
        }
    }

    // === Loading ===

    /// Start a load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.is_loading = true;
        self.phase = LoadPhase::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Finish the load identified by `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Catalog, LoadError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale catalog load"
            );
            return LoadOutcome::Stale;
        }

        self.is_loading = false;
        match result {
            Ok(catalog) => {
                self.replace_catalog(catalog);
                self.phase = LoadPhase::Loaded;
                tracing::info!(materials = self.materials.len(), "Catalog loaded");
                LoadOutcome::Applied
            }
            Err(e) => {
                self.phase = LoadPhase::Error;
                tracing::warn!(error = %e, "Catalog load failed");
                LoadOutcome::Failed
            }
        }
    }

    fn replace_catalog(&mut self, catalog: Catalog) {
        self.materials = catalog.materials;
        self.boards = if catalog.boards.is_empty() {
            derive_boards(&self.materials)
        } else {
            catalog.boards
        };
        self.last_sync = catalog.last_sync;
        self.categories = available_categories(&self.materials);
        self.recompute();
    }

    // === Filter & search ===

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.active_filter = filter;
        self.recompute();
    }

    /// Apply a query immediately, dropping any debounced input.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_input.cancel();
        self.search_query = query.into();
        self.recompute();
    }

    /// Record a keystroke; the query is applied by `tick` once input pauses.
    pub fn input_search(&mut self, query: impl Into<String>, now: Instant) {
        self.search_input.schedule(query.into(), now);
    }

    /// Escape: clear the query right away.
    pub fn cancel_search(&mut self) {
        self.set_search(String::new());
    }

    /// Advance time: apply a due search and expire notifications.
    /// Returns whether anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(query) = self.search_input.poll(now) {
            self.search_query = query;
            self.recompute();
            changed = true;
        }
        if self.notifications.sweep(now) > 0 {
            changed = true;
        }
        changed
    }

    // === Bridge ===

    /// Replace the material with the same id in place, or append it.
    pub fn upsert(&mut self, material: Material) {
        if !material.board.is_empty() && !self.boards.contains(&material.board) {
            self.boards.push(material.board.clone());
            self.boards.sort();
        }
        match self.materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
        self.categories = available_categories(&self.materials);
        self.recompute();
    }

    /// Upsert from a JSON payload. Malformed payloads are logged and
    /// dropped; returns whether the payload was applied.
    pub fn upsert_json(&mut self, payload: &str) -> bool {
        match Material::from_json(payload) {
            Ok(material) => {
                tracing::debug!(id = %material.id, "Upserting material");
                self.upsert(material);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed material payload");
                false
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) {
        self.notifications.push(message, kind, now);
    }

    /// Handle the "apply" action for a material id.
    pub fn apply(&mut self, id: &str, now: Instant) -> ApplyOutcome {
        let Some(material) = self.find(id).cloned() else {
            tracing::warn!(id = %id, "Apply requested for unknown material");
            self.notify("Material not found", NotificationKind::Error, now);
            return ApplyOutcome::NotFound;
        };

        match &self.host {
            Some(host) => {
                tracing::info!(id = %id, "Handing material to host");
                host.apply_material(&material.to_payload());
                ApplyOutcome::Delegated
            }
            None => {
                self.notify(
                    format!("Applied \"{}\" (simulated)", material.title),
                    NotificationKind::Success,
                    now,
                );
                ApplyOutcome::Simulated
            }
        }
    }

    // === Accessors ===

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn filtered(&self) -> &[Material] {
        &self.filtered
    }

    /// Number of visible materials.
    pub fn count(&self) -> usize {
        self.filtered.len()
    }

    pub fn find(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn active_filter(&self) -> &CategoryFilter {
        &self.active_filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Whether typed input is still waiting out the debounce window.
    pub fn pending_search(&self) -> bool {
        self.search_input.is_pending()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn boards(&self) -> &[String] {
        &self.boards
    }

    pub fn last_sync(&self) -> Option<&str> {
        self.last_sync.as_deref()
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    fn recompute(&mut self) {
        self.filtered = filter_materials(&self.materials, &self.active_filter, &self.search_query);
    }
}
