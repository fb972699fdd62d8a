use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::export::{self, ExportError, ARCHIVE_MIME, ARCHIVE_NAME};
use crate::http_server::error_response;
use crate::ServiceState;

/// Stream the whole store as a single ZIP attachment.
pub async fn handler(State(state): State<ServiceState>) -> Result<Response, ExportDataError> {
    let archive = export::export_archive(state.blobs(), state.annotations()).await?;

    tracing::info!(bytes = archive.len(), "export archive built");

    Ok((
        http::StatusCode::OK,
        [
            (http::header::CONTENT_TYPE, ARCHIVE_MIME.to_string()),
            (
                http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
            ),
        ],
        archive,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportDataError {
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl IntoResponse for ExportDataError {
    fn into_response(self) -> Response {
        let ExportDataError::Export(e) = self;
        tracing::error!(error = %e, "export failed");
        // internal failures surface the error's textual description
        error_response(http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}
