use std::collections::HashMap;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

/// Enumerate every blob with its annotation ids, keyed by display name.
/// Blobs sharing a name are disambiguated with a running occurrence
/// counter: `name`, `name (1)`, `name (2)`, ...
pub async fn handler(State(state): State<ServiceState>) -> Result<Response, SchemaError> {
    let mut listing = serde_json::Map::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for blob in state.blobs().list().await? {
        let annotation_ids: Vec<String> = state
            .annotations()
            .find_by_blob(blob.id)
            .await?
            .iter()
            .map(|a| a.id.to_string())
            .collect();

        let count = counts.entry(blob.name.clone()).or_insert(0);
        let key = if *count == 0 {
            blob.name.clone()
        } else {
            format!("{} ({})", blob.name, count)
        };
        *count += 1;

        listing.insert(
            key,
            serde_json::json!({
                "id": blob.id,
                "annotations": annotation_ids,
            }),
        );
    }

    Ok((http::StatusCode::OK, Json(Value::Object(listing))).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for SchemaError {
    fn into_response(self) -> Response {
        let SchemaError::Store(e) = self;
        tracing::error!(error = %e, "schema listing failed");
        error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
    }
}
