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
    pub annotation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Form(req): Form<DeleteRequest>,
) -> Result<impl IntoResponse, DeleteError> {
    let annotation_id = req
        .annotation_id
        .ok_or_else(|| DeleteError::InvalidRequest("no annotation id provided".into()))?;

    if !state.annotations().delete(annotation_id).await? {
        return Err(DeleteError::NotFound);
    }

    tracing::info!(annotation_id = %annotation_id, "annotation deleted");

    Ok((
        http::StatusCode::OK,
        Json(DeleteResponse {
            message: "annotation deleted successfully".to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("annotation not found")]
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
            DeleteError::NotFound => {
                error_response(http::StatusCode::NOT_FOUND, "annotation not found")
            }
            DeleteError::Store(e) => {
                tracing::error!(error = %e, "annotation delete failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
