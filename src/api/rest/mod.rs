pub mod courier;
pub mod customer;
pub mod ws;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::{Confirmation, SeedOutcome};
use crate::error::AppError;
use crate::models::code::HandoverCode;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(courier::router())
        .merge(customer::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/deliveries/seed", post(seed))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub accepted: bool,
    pub outcome: Confirmation,
}

impl From<Confirmation> for ConfirmResponse {
    fn from(outcome: Confirmation) -> Self {
        Self {
            accepted: outcome.accepted(),
            outcome,
        }
    }
}

pub(crate) fn validate_code(raw: &str) -> Result<&str, AppError> {
    HandoverCode::parse(raw)
        .map(|_| raw)
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    deliveries: usize,
    delivered: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let records = state.engine.list().await?;
    let delivered = records.iter().filter(|r| r.is_delivered()).count();

    Ok(Json(HealthResponse {
        status: "ok",
        deliveries: records.len(),
        delivered,
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

#[derive(Serialize)]
struct SeedResponse {
    seeded: bool,
    inserted: usize,
}

async fn seed(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>, AppError> {
    let response = match state.engine.ensure_seeded().await? {
        SeedOutcome::Seeded(inserted) => SeedResponse {
            seeded: true,
            inserted,
        },
        SeedOutcome::AlreadySeeded => SeedResponse {
            seeded: false,
            inserted: 0,
        },
    };
    Ok(Json(response))
}
