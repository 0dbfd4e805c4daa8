use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use uuid::Uuid;

use crate::api::rest::{ConfirmRequest, ConfirmResponse, validate_code};
use crate::error::AppError;
use crate::models::view::CustomerView;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customer/deliveries", get(list_deliveries))
        .route("/customer/deliveries/:id", get(get_delivery))
        .route("/customer/deliveries/:id/confirm", post(confirm))
        .route(
            "/customer/deliveries/:id/photo-approval",
            post(approve_photo).delete(cancel_photo),
        )
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomerView>>, AppError> {
    let records = state.engine.list().await?;
    Ok(Json(records.iter().map(CustomerView::from).collect()))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerView>, AppError> {
    let record = state.engine.get(id).await?;
    Ok(Json(CustomerView::from(&record)))
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let code = validate_code(&payload.code)?;
    let outcome = state.engine.confirm_by_customer(id, code).await?;
    Ok(Json(outcome.into()))
}

async fn approve_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerView>, AppError> {
    let record = state.engine.approve_photo(id).await?;
    Ok(Json(CustomerView::from(&record)))
}

async fn cancel_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerView>, AppError> {
    let record = state.engine.cancel_photo(id).await?;
    Ok(Json(CustomerView::from(&record)))
}
