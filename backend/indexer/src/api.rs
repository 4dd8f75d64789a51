//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::Result;
use crate::events::EventRecord;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    /// The project id, story id or address the list was filtered by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

/// Totals are rendered as strings because on-chain amounts are `i128`.
#[derive(Serialize)]
pub struct DepoResponse {
    pub funded_total: String,
    pub redeemed_total: String,
    pub paid_to_projects_total: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Stored event type, e.g. `funds_received`.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

fn events_response(subject: Option<String>, result: Result<Vec<EventRecord>>) -> Response {
    match result {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(EventsResponse {
                    subject,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: crate::errors::IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events[?type=<event_type>]`
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let result = db::get_all_events(&state.pool, query.event_type.as_deref()).await;
    events_response(None, result)
}

/// `GET /projects/:id/events`
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Response {
    let result = db::get_events_for_project(&state.pool, &project_id).await;
    events_response(Some(project_id), result)
}

/// `GET /stories/:id/events`
///
/// The full lifecycle of a user story: creation, acceptance, sign-ins,
/// start, completion or refund.
pub async fn get_story_events(
    State(state): State<Arc<ApiState>>,
    Path(story_id): Path<String>,
) -> Response {
    let result = db::get_events_for_story(&state.pool, &story_id).await;
    events_response(Some(story_id), result)
}

/// `GET /accounts/:address/events`
pub async fn get_account_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Response {
    let result = db::get_events_for_actor(&state.pool, &address).await;
    events_response(Some(address), result)
}

/// `GET /depo`
///
/// Value that moved through the pool according to indexed events. This is an
/// observation of history, not a read of the contract's deposit balance.
pub async fn get_depo(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_flow_totals(&state.pool).await {
        Ok(totals) => (
            StatusCode::OK,
            Json(DepoResponse {
                funded_total: totals.funded.to_string(),
                redeemed_total: totals.redeemed.to_string(),
                paid_to_projects_total: totals.paid_to_projects.to_string(),
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}
