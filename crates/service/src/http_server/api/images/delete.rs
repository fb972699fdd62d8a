use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Form(req): Form<DeleteRequest>,
) -> Result<impl IntoResponse, DeleteError> {
    let file_id = req
        .file_id
        .ok_or_else(|| DeleteError::InvalidRequest("missing file_id".into()))?;

    if state.blobs().get(file_id).await?.is_none() {
        return Err(DeleteError::NotFound);
    }

    // Cascade: annotations referencing the blob go first
    let annotations_removed = state.annotations().delete_by_blob(file_id).await?;
    state.blobs().delete(file_id).await?;

    tracing::info!(
        file_id = %file_id,
        annotations_removed = annotations_removed,
        "image deleted"
    );

    Ok((
        http::StatusCode::OK,
        Json(DeleteResponse {
            message: "image and annotations deleted successfully".to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("file not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::InvalidRequest(msg) => {
                error_response(http::StatusCode::BAD_REQUEST, msg)
            }
            DeleteError::NotFound => error_response(http::StatusCode::NOT_FOUND, "file not found"),
            DeleteError::Store(e) => {
                tracing::error!(error = %e, "image delete failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
