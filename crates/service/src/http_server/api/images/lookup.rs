use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use annex_store::{Blob, StoreError};

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    /// Optional: blob id to fetch
    #[serde(default)]
    pub file_id: Option<Uuid>,

    /// Optional: blob name to fetch (newest match wins)
    #[serde(default)]
    pub file_name: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(req): Query<LookupRequest>,
) -> Result<Response, LookupError> {
    let blob = match (req.file_id, req.file_name) {
        // no filters: list every blob as {id: name}
        (None, None) => {
            let listing: HashMap<Uuid, String> = state
                .blobs()
                .list()
                .await?
                .into_iter()
                .map(|b| (b.id, b.name))
                .collect();
            return Ok((http::StatusCode::OK, Json(listing)).into_response());
        }
        // both given: exact match required on both
        (Some(id), Some(name)) => state.blobs().find_by_id_and_name(id, &name).await?,
        (Some(id), None) => state.blobs().get(id).await?,
        (None, Some(name)) => state.blobs().find_by_name(&name).await?,
    };

    let blob = blob.ok_or(LookupError::NotFound)?;
    serve_payload(&state, blob).await
}

async fn serve_payload(state: &ServiceState, blob: Blob) -> Result<Response, LookupError> {
    // A row without a payload reports the same way as a missing row
    let data = state
        .blobs()
        .read(blob.id)
        .await?
        .ok_or(LookupError::NotFound)?;

    Ok((
        http::StatusCode::OK,
        [(http::header::CONTENT_TYPE, blob.mime_type)],
        data,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("file not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            LookupError::NotFound => {
                error_response(http::StatusCode::NOT_FOUND, "file not found")
            }
            LookupError::Store(e) => {
                tracing::error!(error = %e, "image lookup failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
