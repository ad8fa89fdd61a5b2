//! # Bridge API
//!
//! HTTP form of the host bridge. Every call is fire-and-forget and answers
//! `202 Accepted`; malformed payloads are dropped with a warning.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use materia_core::BridgeCommand;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::SharedState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotifyRequest {
    pub message: String,
    /// `success` or `error`; anything else is treated as `success`
    #[serde(default)]
    pub kind: String,
}

pub fn bridge_routes() -> Router<SharedState> {
    Router::new()
        .route("/bridge", post(command))
        .route("/bridge/refresh", post(refresh))
        .route("/bridge/upsert", post(upsert))
        .route("/bridge/notify", post(notify))
}

/// Tagged bridge command, e.g. `{"op": "refresh"}`
#[utoipa::path(
    post,
    path = "/api/v1/bridge",
    tag = "bridge",
    request_body(content = String, description = "BridgeCommand JSON", content_type = "application/json"),
    responses(
        (status = 202, description = "Accepted")
    )
)]
pub async fn command(State(state): State<SharedState>, body: String) -> StatusCode {
    match serde_json::from_str::<BridgeCommand>(&body) {
        Ok(command) => state.library.dispatch(command).await,
        Err(e) => tracing::warn!(error = %e, "Ignoring malformed bridge command"),
    }
    StatusCode::ACCEPTED
}

/// Reload the catalog from its source
#[utoipa::path(
    post,
    path = "/api/v1/bridge/refresh",
    tag = "bridge",
    responses(
        (status = 202, description = "Refresh started")
    )
)]
pub async fn refresh(State(state): State<SharedState>) -> StatusCode {
    state.library.dispatch(BridgeCommand::Refresh).await;
    StatusCode::ACCEPTED
}

/// Replace or append one material; body is the material JSON
#[utoipa::path(
    post,
    path = "/api/v1/bridge/upsert",
    tag = "bridge",
    request_body(content = String, description = "Material JSON", content_type = "application/json"),
    responses(
        (status = 202, description = "Accepted")
    )
)]
pub async fn upsert(State(state): State<SharedState>, body: String) -> StatusCode {
    state
        .library
        .dispatch(BridgeCommand::Upsert {
            material_json: body,
        })
        .await;
    StatusCode::ACCEPTED
}

/// Show a transient notification
#[utoipa::path(
    post,
    path = "/api/v1/bridge/notify",
    tag = "bridge",
    request_body = NotifyRequest,
    responses(
        (status = 202, description = "Accepted")
    )
)]
pub async fn notify(State(state): State<SharedState>, body: String) -> StatusCode {
    match serde_json::from_str::<NotifyRequest>(&body) {
        Ok(req) => {
            state
                .library
                .dispatch(BridgeCommand::Notify {
                    message: req.message,
                    kind: req.kind,
                })
                .await
        }
        Err(e) => tracing::warn!(error = %e, "Ignoring malformed notify request"),
    }
    StatusCode::ACCEPTED
}
