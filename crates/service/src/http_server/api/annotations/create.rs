use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// Blob id the annotation belongs to. The blob is not required to
    /// exist; dangling records are tolerated downstream.
    #[serde(default)]
    pub file_id: Option<Uuid>,

    /// Annotation payload; defaults to an empty mapping
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub message: String,
    pub id: Uuid,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    let file_id = req
        .file_id
        .ok_or_else(|| CreateError::InvalidRequest("no file id provided".into()))?;
    let data = req.data.unwrap_or_else(|| serde_json::json!({}));

    let id = state.annotations().insert(file_id, data).await?;

    tracing::info!(annotation_id = %id, file_id = %file_id, "annotation created");

    Ok((
        http::StatusCode::CREATED,
        Json(CreateResponse {
            message: "annotation added successfully".to_string(),
            id,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::InvalidRequest(msg) => {
                error_response(http::StatusCode::BAD_REQUEST, msg)
            }
            CreateError::Store(e) => {
                tracing::error!(error = %e, "annotation create failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
