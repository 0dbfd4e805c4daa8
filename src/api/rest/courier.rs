use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{ConfirmRequest, ConfirmResponse, validate_code};
use crate::engine::PhotoOutcome;
use crate::error::AppError;
use crate::models::view::CourierView;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courier/deliveries", get(list_deliveries))
        .route("/courier/deliveries/:id", get(get_delivery))
        .route("/courier/deliveries/:id/confirm", post(confirm))
        .route("/courier/deliveries/:id/photo-request", post(request_photo))
        .route("/courier/deliveries/:id/photo", post(submit_photo))
}

#[derive(Deserialize)]
pub struct PhotoRequest {
    pub image_base64: String,
}

#[derive(Serialize)]
pub struct PhotoResponse {
    pub delivered: bool,
    pub reason: String,
    pub delivery: Option<CourierView>,
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourierView>>, AppError> {
    let records = state.engine.list().await?;
    Ok(Json(records.iter().map(CourierView::from).collect()))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourierView>, AppError> {
    let record = state.engine.get(id).await?;
    Ok(Json(CourierView::from(&record)))
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let code = validate_code(&payload.code)?;
    let outcome = state.engine.confirm_by_courier(id, code).await?;
    Ok(Json(outcome.into()))
}

async fn request_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourierView>, AppError> {
    let record = state.engine.request_photo(id).await?;
    Ok(Json(CourierView::from(&record)))
}

async fn submit_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PhotoRequest>,
) -> Result<Json<PhotoResponse>, AppError> {
    let image = decode_image(&payload.image_base64)?;

    let response = match state.engine.verify_by_photo(id, &image).await? {
        PhotoOutcome::Delivered { record, reason } => PhotoResponse {
            delivered: true,
            reason,
            delivery: Some(CourierView::from(&record)),
        },
        PhotoOutcome::Rejected { reason } => PhotoResponse {
            delivered: false,
            reason,
            delivery: None,
        },
    };

    Ok(Json(response))
}

fn decode_image(raw: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match raw.split_once("base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw,
    };

    BASE64
        .decode(encoded.trim())
        .map_err(|err| AppError::BadRequest(format!("image_base64 is not valid base64: {err}")))
}
