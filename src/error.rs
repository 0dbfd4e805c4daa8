use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("photo classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("store conflict: {0}")]
    StoreConflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::PreconditionFailed(_) => "precondition_failed",
            AppError::ClassifierUnavailable(_) => "classifier_unavailable",
            AppError::StoreConflict(_) => "store_conflict",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::ClassifierUnavailable(_) | AppError::StoreConflict(_)
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("delivery {id} not found")),
            StoreError::ConditionFailed(id) => {
                AppError::StoreConflict(format!("delivery {id} was changed by a concurrent writer"))
            }
            StoreError::InvalidRecord(id) => {
                AppError::Internal(format!("refused to store inconsistent delivery {id}"))
            }
            StoreError::Unavailable(msg) => AppError::Internal(format!("store unavailable: {msg}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PreconditionFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::ClassifierUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::StoreConflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
            "retryable": self.is_retryable(),
        }));

        (status, body).into_response()
    }
}
