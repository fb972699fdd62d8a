use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use annex_store::StoreError;

use crate::http_server::error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_id: Uuid,
}

pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let mut image: Option<Vec<u8>> = None;
    let mut name: Option<String> = None;

    // Parse multipart form data
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?;
                image = Some(data.to_vec());
            }
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| UploadError::Multipart(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let image =
        image.ok_or_else(|| UploadError::InvalidRequest("no image file provided".into()))?;
    let name = name.ok_or_else(|| UploadError::InvalidRequest("no file name provided".into()))?;

    let size = image.len();
    let file_id = state.blobs().put(image, &name).await?;

    tracing::info!(file_id = %file_id, name = %name, size = size, "image uploaded");

    Ok((
        http::StatusCode::CREATED,
        Json(UploadResponse {
            message: "file uploaded successfully".to_string(),
            file_id,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("multipart error: {0}")]
    Multipart(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::InvalidRequest(msg) | UploadError::Multipart(msg) => {
                error_response(http::StatusCode::BAD_REQUEST, msg)
            }
            UploadError::Store(e) => {
                tracing::error!(error = %e, "image upload failed");
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
            }
        }
    }
}
