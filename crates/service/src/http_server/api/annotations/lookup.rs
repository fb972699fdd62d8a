use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    /// Optional: blob id whose annotations to list
    #[serde(default)]
    pub file_id: Option<Uuid>,

    /// Optional: single annotation id to fetch
    #[serde(default)]
    pub annotation_id: Option<Uuid>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(req): Query<LookupRequest>,
) -> Result<Response, LookupError> {
    match (req.file_id, req.annotation_id) {
        // no filters: every blob with its annotation ids
        (None, None) => {
            let mut listing = serde_json::Map::new();
            for blob in state.blobs().list().await? {
                let ids: Vec<String> = state
                    .annotations()
                    .find_by_blob(blob.id)
                    .await?
                    .iter()
                    .map(|a| a.id.to_string())
                    .collect();
                listing.insert(blob.id.to_string(), serde_json::json!(ids));
            }
            Ok((http::StatusCode::OK, Json(Value::Object(listing))).into_response())
        }
        // both given: the record must match both
        (Some(file_id), Some(annotation_id)) => {
            let annotation = state
                .annotations()
                .get(annotation_id)
                .await?
                .filter(|a| a.blob_id == file_id)
                .ok_or(LookupError::NotFound)?;
            Ok((http::StatusCode::OK, Json(annotation.data)).into_response())
        }
        // one blob's annotations as {annotation_id: data}, newest first
        (Some(file_id), None) => {
            let mut listing = serde_json::Map::new();
            for annotation in state.annotations().find_by_blob(file_id).await? {
                listing.insert(annotation.id.to_string(), annotation.data);
            }
            Ok((http::StatusCode::OK, Json(Value::Object(listing))).into_response())
        }
        (None, Some(annotation_id)) => {
            let annotation = state
                .annotations()
                .get(annotation_id)
                .await?
                .ok_or(LookupError::NotFound)?;
            Ok((http::StatusCode::OK, Json(annotation.data)).into_response())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("annotation not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            LookupError::NotFound => {
                error_response(http::StatusCode::NOT_FOUND, "annotation not found")
            }
            LookupError::Store(e) => {
                tracing::error!(error = %e, "annotation lookup failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
