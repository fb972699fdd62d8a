use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub annotation_id: Option<Uuid>,

    /// Replaces the stored data wholesale; no partial merge
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub message: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, UpdateError> {
    let annotation_id = req
        .annotation_id
        .ok_or_else(|| UpdateError::InvalidRequest("no annotation id provided".into()))?;
    let data = req
        .data
        .ok_or_else(|| UpdateError::InvalidRequest("no data provided".into()))?;

    if !state.annotations().update(annotation_id, data).await? {
        return Err(UpdateError::NotFound);
    }

    tracing::info!(annotation_id = %annotation_id, "annotation updated");

    Ok((
        http::StatusCode::OK,
        Json(UpdateResponse {
            message: "annotation updated successfully".to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("annotation not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        match self {
            UpdateError::InvalidRequest(msg) => {
                error_response(http::StatusCode::BAD_REQUEST, msg)
            }
            UpdateError::NotFound => {
                error_response(http::StatusCode::NOT_FOUND, "annotation not found")
            }
            UpdateError::Store(e) => {
                tracing::error!(error = %e, "annotation update failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
