use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use common::storage::StorageError;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serve a stored blob under its public `/storage/{path}` URL.
#[instrument(skip(state))]
pub async fn serve_blob(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let size = state.blob_store.size(&path).await.map_err(not_found)?;
    let reader = state.blob_store.get_stream(&path).await.map_err(not_found)?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Missing and malformed paths both read as absent files.
fn not_found(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(_) | StorageError::InvalidPath(_) => {
            AppError::NotFound("File not found".into())
        }
        other => other.into(),
    }
}
