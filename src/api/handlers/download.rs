use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_util::io::ReaderStream;

use crate::api::response::ApiError;
use crate::AppState;

/// Size of each chunk read from the report file.
const DOWNLOAD_CHUNK_SIZE: usize = 4096;

/// Stream the report file produced by the update tool as an attachment.
/// Route: GET /downloads/:name
///
/// Content-Length is the size at open time. A read error after the headers
/// are sent aborts the body; the client sees a truncated download.
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let filename = state.config.report_filename().unwrap_or_default();
    if name != filename {
        return Err(ApiError::not_found("404 page not found"));
    }

    let path = &state.config.paths.report_path;
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::internal(format!("Error opening file: {e}")))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Error getting file info: {e}")))?;

    let report = path.display().to_string();
    let stream = ReaderStream::with_capacity(file, DOWNLOAD_CHUNK_SIZE).map(move |chunk| {
        if let Err(ref e) = chunk {
            tracing::error!(file = %report, error = %e, "Error serving file");
        }
        chunk
    });

    let mut response = (StatusCode::OK, Body::from_stream(stream)).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/octet-stream"),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        header::HeaderValue::from(metadata.len()),
    );

    match format!("attachment; filename=\"{filename}\"").parse() {
        Ok(value) => {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(e) => {
            tracing::warn!(file = %filename, error = %e, "Report name is not a valid header value");
        }
    }

    Ok(response)
}
