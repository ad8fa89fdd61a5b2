//! # Material Library
//!
//! Async service around a [`ViewController`]: fetches catalogs, serializes
//! access to the view, and broadcasts a [`ViewEvent`] for every change.
//!
//! The fetch is the only await point and runs without holding the view
//! lock. When refreshes overlap, the latest load wins: `spawn_refresh`
//! aborts the superseded task, and the controller's generation check
//! discards any completion that still lands.

use crate::bridge::{BridgeCommand, MaterialHost};
use crate::catalog::{CatalogFetcher, CatalogSource, Material};
use crate::view::render::{render_page, render_text, RenderedView};
use crate::view::{
    ApplyOutcome, CategoryFilter, LoadOutcome, NotificationKind, ViewController, ViewEvent,
    ViewEventKind,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 100;

/// Shared handle to the material catalog view
pub struct MaterialLibrary {
    view: RwLock<ViewController>,
    fetcher: Arc<dyn CatalogFetcher>,
    source: CatalogSource,
    event_tx: broadcast::Sender<ViewEvent>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl MaterialLibrary {
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        source: CatalogSource,
        host: Option<Arc<dyn MaterialHost>>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            view: RwLock::new(ViewController::new(host)),
            fetcher,
            source,
            event_tx,
            refresh_task: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    // === Loading ===

    /// Initial load; same as `refresh`.
    pub async fn load(&self) -> LoadOutcome {
        self.refresh().await
    }

    /// Fetch the catalog and replace the materials, unless a newer load
    /// started in the meantime.
    pub async fn refresh(&self) -> LoadOutcome {
        let ticket = self.view.write().await.begin_load();
        tracing::info!(source = %self.source, generation = ticket.generation(), "Loading catalog");
        self.emit(ViewEvent::new(ViewEventKind::LoadStarted).with_data(serde_json::json!({
            "generation": ticket.generation(),
            "source": self.source.to_string(),
        })));

        let result = self.fetcher.fetch(&self.source).await;
        let error = result.as_ref().err().map(|e| e.to_string());

        let (outcome, count) = {
            let mut view = self.view.write().await;
            let outcome = view.finish_load(ticket, result);
            (outcome, view.count())
        };

        match outcome {
            LoadOutcome::Applied => self.emit(
                ViewEvent::new(ViewEventKind::LoadCompleted)
                    .with_data(serde_json::json!({ "count": count })),
            ),
            LoadOutcome::Failed => self.emit(
                ViewEvent::new(ViewEventKind::LoadFailed)
                    .with_data(serde_json::json!({ "error": error })),
            ),
            LoadOutcome::Stale => {}
        }
        outcome
    }

    /// Refresh in the background, aborting any refresh still in flight.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let library = Arc::clone(self);
        let handle = tokio::spawn(async move {
            library.refresh().await;
        });

        let Ok(mut slot) = self.refresh_task.lock() else {
            return;
        };
        if let Some(previous) = slot.replace(handle) {
            if !previous.is_finished() {
                tracing::debug!("Aborting superseded catalog refresh");
            }
            previous.abort();
        }
    }

    // === Bridge ===

    /// Entry point for host commands. Never fails; bad input is logged.
    pub async fn dispatch(self: &Arc<Self>, command: BridgeCommand) {
        match command {
            BridgeCommand::Refresh => {
                tracing::info!("Host requested refresh");
                self.spawn_refresh();
            }
            BridgeCommand::Upsert { material_json } => {
                let applied = self.view.write().await.upsert_json(&material_json);
                if applied {
                    self.emit(ViewEvent::new(ViewEventKind::ViewUpdated));
                }
            }
            BridgeCommand::Notify { message, kind } => {
                self.notify(message, NotificationKind::parse_lenient(&kind))
                    .await;
            }
        }
    }

    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        self.view
            .write()
            .await
            .notify(message.clone(), kind, Instant::now());
        self.emit(ViewEvent::new(ViewEventKind::Notified).with_data(serde_json::json!({
            "message": message,
            "kind": kind.as_str(),
        })));
    }

    // === View operations ===

    pub async fn set_filter(&self, filter: CategoryFilter) {
        tracing::debug!(filter = %filter, "Filter changed");
        self.view.write().await.set_filter(filter);
        self.emit(ViewEvent::new(ViewEventKind::ViewUpdated));
    }

    /// Debounced search input; applied by the ticker once typing pauses.
    pub async fn input_search(&self, query: impl Into<String>) {
        self.view
            .write()
            .await
            .input_search(query, Instant::now());
    }

    /// Apply a query without waiting for the debounce window.
    pub async fn set_search(&self, query: impl Into<String>) {
        self.view.write().await.set_search(query);
        self.emit(ViewEvent::new(ViewEventKind::ViewUpdated));
    }

    pub async fn cancel_search(&self) {
        self.view.write().await.cancel_search();
        self.emit(ViewEvent::new(ViewEventKind::ViewUpdated));
    }

    pub async fn apply(&self, id: &str) -> ApplyOutcome {
        let outcome = self.view.write().await.apply(id, Instant::now());
        let kind = match outcome {
            ApplyOutcome::NotFound => ViewEventKind::Notified,
            ApplyOutcome::Delegated | ApplyOutcome::Simulated => ViewEventKind::MaterialApplied,
        };
        self.emit(ViewEvent::new(kind).with_data(serde_json::json!({
            "id": id,
            "outcome": outcome,
        })));
        outcome
    }

    /// Advance the view clock. Returns whether anything visible changed.
    pub async fn tick(&self, now: Instant) -> bool {
        let changed = self.view.write().await.tick(now);
        if changed {
            self.emit(ViewEvent::new(ViewEventKind::ViewUpdated));
        }
        changed
    }

    /// Drive `tick` every `period` until the library is dropped.
    pub fn spawn_ticker(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let library = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(library) = library.upgrade() else {
                    break;
                };
                library.tick(Instant::now()).await;
            }
        })
    }

    // === Reads ===

    /// Run `f` against the current view state.
    pub async fn with_view<R>(&self, f: impl FnOnce(&ViewController) -> R) -> R {
        f(&*self.view.read().await)
    }

    pub async fn filtered(&self) -> Vec<Material> {
        self.with_view(|view| view.filtered().to_vec()).await
    }

    pub async fn rendered(&self) -> RenderedView {
        self.with_view(RenderedView::from_controller).await
    }

    pub async fn render_page(&self, title: &str) -> String {
        self.with_view(|view| render_page(view, title)).await
    }

    pub async fn render_text(&self) -> String {
        self.with_view(render_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingHost;
    use crate::catalog::Catalog;
    use crate::error::LoadError;
    use crate::view::{LoadPhase, SEARCH_DEBOUNCE};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that replays scripted responses, each after a delay
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<(Duration, Result<Catalog, LoadError>)>>,
        finished: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<(Duration, Result<Catalog, LoadError>)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                finished: AtomicUsize::new(0),
            })
        }

        /// Fetches that ran to completion.
        fn finished(&self) -> usize {
            self.finished.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogFetcher for ScriptedFetcher {
        async fn fetch(&self, _source: &CatalogSource) -> Result<Catalog, LoadError> {
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some((delay, result)) => {
                    tokio::time::sleep(delay).await;
                    self.finished.fetch_add(1, Ordering::SeqCst);
                    result
                }
                None => Err(LoadError::Status(404)),
            }
        }
    }

    fn catalog(ids: &[&str]) -> Catalog {
        Catalog {
            materials: ids
                .iter()
                .map(|id| Material {
                    id: id.to_string(),
                    title: format!("Material {id}"),
                    description: String::new(),
                    image_url: String::new(),
                    source_url: String::new(),
                    tags: vec!["kayu".into()],
                    board: "Wood".into(),
                })
                .collect(),
            boards: Vec::new(),
            last_sync: None,
        }
    }

    fn library(
        responses: Vec<(Duration, Result<Catalog, LoadError>)>,
        host: Option<Arc<dyn MaterialHost>>,
    ) -> Arc<MaterialLibrary> {
        Arc::new(MaterialLibrary::new(
            ScriptedFetcher::new(responses),
            CatalogSource::Remote("http://catalog.test/library.json".into()),
            host,
        ))
    }

    async fn ids(library: &MaterialLibrary) -> Vec<String> {
        library
            .with_view(|view| view.materials().iter().map(|m| m.id.clone()).collect())
            .await
    }

    #[tokio::test]
    async fn test_load_populates_view_and_emits() {
        let library = library(vec![(Duration::ZERO, Ok(catalog(&["a", "b"])))], None);
        let mut rx = library.subscribe();

        assert_eq!(library.load().await, LoadOutcome::Applied);
        assert_eq!(ids(&library).await, vec!["a", "b"]);

        assert_eq!(rx.recv().await.unwrap().kind, ViewEventKind::LoadStarted);
        let completed = rx.recv().await.unwrap();
        assert_eq!(completed.kind, ViewEventKind::LoadCompleted);
        assert_eq!(completed.data.unwrap()["count"], 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_materials() {
        let library = library(
            vec![
                (Duration::ZERO, Ok(catalog(&["a"]))),
                (Duration::ZERO, Err(LoadError::Status(500))),
            ],
            None,
        );
        library.load().await;

        assert_eq!(library.refresh().await, LoadOutcome::Failed);
        assert_eq!(ids(&library).await, vec!["a"]);
        assert_eq!(
            library.with_view(|view| view.phase()).await,
            LoadPhase::Error
        );
    }

    #[tokio::test]
    async fn test_overlapping_refresh_latest_wins() {
        let library = library(
            vec![
                (Duration::from_millis(100), Ok(catalog(&["old"]))),
                (Duration::ZERO, Ok(catalog(&["new"]))),
            ],
            None,
        );

        let (first, second) = tokio::join!(library.refresh(), library.refresh());
        assert_eq!(first, LoadOutcome::Stale);
        assert_eq!(second, LoadOutcome::Applied);
        assert_eq!(ids(&library).await, vec!["new"]);
        assert!(!library.with_view(|view| view.is_loading()).await);
    }

    #[tokio::test]
    async fn test_spawn_refresh_aborts_previous() {
        let fetcher = ScriptedFetcher::new(vec![
            (Duration::from_millis(200), Ok(catalog(&["old"]))),
            (Duration::ZERO, Ok(catalog(&["new"]))),
        ]);
        let library = Arc::new(MaterialLibrary::new(
            fetcher.clone(),
            CatalogSource::Remote("http://catalog.test/library.json".into()),
            None,
        ));
        let mut rx = library.subscribe();

        // First refresh has taken its response once LoadStarted is seen
        library.spawn_refresh();
        let started = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(started.kind, ViewEventKind::LoadStarted);
        library.spawn_refresh();

        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
            if event.kind == ViewEventKind::LoadCompleted {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(ids(&library).await, vec!["new"]);
        assert_eq!(fetcher.finished(), 1);
        assert!(!library.with_view(|view| view.is_loading()).await);
        assert_eq!(
            library.with_view(|view| view.phase()).await,
            LoadPhase::Loaded
        );
    }

    #[tokio::test]
    async fn test_dispatch_upsert_and_notify() {
        let library = library(vec![(Duration::ZERO, Ok(catalog(&["a"])))], None);
        library.load().await;

        library
            .dispatch(BridgeCommand::Upsert {
                material_json: r#"{"id": "b", "title": "Batik", "tags": ["batik"]}"#.into(),
            })
            .await;
        library
            .dispatch(BridgeCommand::Upsert {
                material_json: "not json".into(),
            })
            .await;
        library
            .dispatch(BridgeCommand::Notify {
                message: "Synced".into(),
                kind: "bogus".into(),
            })
            .await;

        assert_eq!(ids(&library).await, vec!["a", "b"]);
        let notes = library
            .with_view(|view| {
                view.notifications()
                    .iter()
                    .map(|n| (n.message.clone(), n.kind))
                    .collect::<Vec<_>>()
            })
            .await;
        assert_eq!(notes, vec![("Synced".to_string(), NotificationKind::Success)]);
    }

    #[tokio::test]
    async fn test_apply_delegates_to_host() {
        let host = Arc::new(RecordingHost::new());
        let library = library(
            vec![(Duration::ZERO, Ok(catalog(&["a"])))],
            Some(host.clone() as Arc<dyn MaterialHost>),
        );
        library.load().await;

        assert_eq!(library.apply("a").await, ApplyOutcome::Delegated);
        assert_eq!(library.apply("missing").await, ApplyOutcome::NotFound);
        assert_eq!(host.received().len(), 1);
        assert!(host.received()[0].contains("\"id\":\"a\""));
    }

    #[tokio::test]
    async fn test_search_applies_after_debounce_tick() {
        let library = library(
            vec![(Duration::ZERO, Ok(catalog(&["teak", "oak"])))],
            None,
        );
        library.load().await;

        library.input_search("teak").await;
        assert_eq!(library.filtered().await.len(), 2);
        assert!(!library.tick(Instant::now()).await);

        let later = Instant::now() + SEARCH_DEBOUNCE + Duration::from_millis(10);
        assert!(library.tick(later).await);
        let filtered = library.filtered().await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "teak");

        library.cancel_search().await;
        assert_eq!(library.filtered().await.len(), 2);
    }
}
