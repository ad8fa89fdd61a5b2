//! # API v1
//!
//! - `view` - page, filter, search, apply
//! - `bridge` - host commands (refresh, upsert, notify)
//! - `events` - SSE stream of view events

pub mod bridge;
pub mod events;
pub mod view;

use axum::{http::header, response::IntoResponse, routing::get, Router};
use utoipa::OpenApi;

use crate::SharedState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Materia API",
        version = "1.0.0",
        description = "Material catalog view and host bridge"
    ),
    paths(
        view::get_view,
        view::list_materials,
        view::set_filter,
        view::search,
        view::cancel_search,
        view::apply_material,
        bridge::command,
        bridge::refresh,
        bridge::upsert,
        bridge::notify,
        events::events
    ),
    components(
        schemas(
            view::ViewResponse,
            view::MaterialResponse,
            view::FilterRequest,
            view::SearchRequest,
            view::ApplyResponse,
            bridge::NotifyRequest
        )
    ),
    tags(
        (name = "view", description = "Catalog view operations"),
        (name = "bridge", description = "Host bridge"),
        (name = "events", description = "Live view events")
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/api/v1`
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .merge(view::view_routes())
        .merge(bridge::bridge_routes())
        .route("/events", get(events::events))
        .route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> impl IntoResponse {
    let doc = ApiDoc::openapi().to_json().unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], doc)
}
