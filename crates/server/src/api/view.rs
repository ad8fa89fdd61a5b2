//! # View API
//!
//! Page rendering and the user-facing view operations: filter, debounced
//! search, and apply.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use materia_core::view::{ApplyOutcome, CategoryFilter, RenderedView};
use materia_core::{Material, MaterialLibrary};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::SharedState;

// === API Types ===

/// Current view state plus pre-rendered HTML fragments
#[derive(Debug, Serialize, ToSchema)]
pub struct ViewResponse {
    /// `idle`, `loading`, `loaded` or `error`
    pub phase: String,
    pub is_loading: bool,
    /// Materials in the catalog
    pub total: usize,
    /// Materials passing filter and search
    pub visible: usize,
    pub active_filter: String,
    pub search_query: String,
    /// Typed search input not yet applied
    pub pending_search: bool,
    pub boards: Vec<String>,
    pub last_sync: Option<String>,
    // Fragments
    pub filters: String,
    pub grid: String,
    pub count: String,
    pub sync: String,
    pub notifications: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaterialResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub source_url: String,
    pub tags: Vec<String>,
    pub board: String,
}

impl From<Material> for MaterialResponse {
    fn from(m: Material) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image_url: m.image_url,
            source_url: m.source_url,
            tags: m.tags,
            board: m.board,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FilterRequest {
    /// Category tag, or `all`
    pub filter: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
    /// Skip the debounce window
    #[serde(default)]
    pub immediate: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyResponse {
    pub id: String,
    /// `delegated`, `simulated` or `not_found`
    pub outcome: String,
}

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/view", get(get_view))
        .route("/view/filter", post(set_filter))
        .route("/view/search", post(search))
        .route("/view/search/cancel", post(cancel_search))
        .route("/materials", get(list_materials))
        .route("/materials/:id/apply", post(apply_material))
}

pub async fn snapshot(library: &MaterialLibrary) -> ViewResponse {
    library
        .with_view(|view| {
            let rendered = RenderedView::from_controller(view);
            ViewResponse {
                phase: view.phase().as_str().to_string(),
                is_loading: view.is_loading(),
                total: view.materials().len(),
                visible: view.count(),
                active_filter: view.active_filter().to_string(),
                search_query: view.search_query().to_string(),
                pending_search: view.pending_search(),
                boards: view.boards().to_vec(),
                last_sync: view.last_sync().map(String::from),
                filters: rendered.filters,
                grid: rendered.grid,
                count: rendered.count,
                sync: rendered.sync,
                notifications: rendered.notifications,
            }
        })
        .await
}

// === Handlers ===

/// Full HTML page
pub async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(state.library.render_page(&state.title).await)
}

/// Current view state
#[utoipa::path(
    get,
    path = "/api/v1/view",
    tag = "view",
    responses(
        (status = 200, description = "Current view", body = ViewResponse)
    )
)]
pub async fn get_view(State(state): State<SharedState>) -> Json<ViewResponse> {
    Json(snapshot(&state.library).await)
}

/// Materials passing the active filter and search
#[utoipa::path(
    get,
    path = "/api/v1/materials",
    tag = "view",
    responses(
        (status = 200, description = "Filtered materials, catalog order", body = [MaterialResponse])
    )
)]
pub async fn list_materials(State(state): State<SharedState>) -> Json<Vec<MaterialResponse>> {
    let materials = state.library.filtered().await;
    Json(materials.into_iter().map(MaterialResponse::from).collect())
}

/// Select the active category
#[utoipa::path(
    post,
    path = "/api/v1/view/filter",
    tag = "view",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "View after filtering", body = ViewResponse)
    )
)]
pub async fn set_filter(
    State(state): State<SharedState>,
    Json(req): Json<FilterRequest>,
) -> Json<ViewResponse> {
    state
        .library
        .set_filter(CategoryFilter::parse(&req.filter))
        .await;
    Json(snapshot(&state.library).await)
}

/// Search input; applied once typing pauses unless `immediate`
#[utoipa::path(
    post,
    path = "/api/v1/view/search",
    tag = "view",
    request_body = SearchRequest,
    responses(
        (status = 202, description = "Search scheduled or applied")
    )
)]
pub async fn search(
    State(state): State<SharedState>,
    Json(req): Json<SearchRequest>,
) -> StatusCode {
    if req.immediate {
        state.library.set_search(req.query).await;
    } else {
        state.library.input_search(req.query).await;
    }
    StatusCode::ACCEPTED
}

/// Clear the search query immediately
#[utoipa::path(
    post,
    path = "/api/v1/view/search/cancel",
    tag = "view",
    responses(
        (status = 200, description = "View with search cleared", body = ViewResponse)
    )
)]
pub async fn cancel_search(State(state): State<SharedState>) -> Json<ViewResponse> {
    state.library.cancel_search().await;
    Json(snapshot(&state.library).await)
}

/// Hand a material to the host (or simulate when none is configured)
#[utoipa::path(
    post,
    path = "/api/v1/materials/{id}/apply",
    tag = "view",
    params(
        ("id" = String, Path, description = "Material id")
    ),
    responses(
        (status = 200, description = "Delegated or simulated", body = ApplyResponse),
        (status = 404, description = "Unknown material id", body = ApplyResponse)
    )
)]
pub async fn apply_material(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let outcome = state.library.apply(&id).await;
    let status = match outcome {
        ApplyOutcome::NotFound => StatusCode::NOT_FOUND,
        ApplyOutcome::Delegated | ApplyOutcome::Simulated => StatusCode::OK,
    };
    (
        status,
        Json(ApplyResponse {
            id,
            outcome: outcome.as_str().to_string(),
        }),
    )
}
