use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::RESULT_TEMPLATE;
use crate::api::response::ApiError;
use crate::storage::UploadError;
use crate::updater::UpdateRequest;
use crate::AppState;

const CSV_FILE_FIELD: &str = "csvFile";
const TABLE_NAME_FIELD: &str = "tableName";
const COLUMN_NAME_FIELD: &str = "columnName";

pub const UPDATE_SUCCESS_MESSAGE: &str = "Database updated successfully!";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ResultPage {
    pub message: String,
    pub has_report: bool,
    pub report_filename: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Save an uploaded CSV and run the update tool over it.
/// Route: POST /upload
///
/// The file is fully on disk before the update tool starts. It is left in
/// place if the tool fails.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let mut saved_path: Option<PathBuf> = None;
    let mut table_name: Option<String> = None;
    let mut column_name: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            CSV_FILE_FIELD if saved_path.is_none() => {
                // A part without a filename is a plain value, not a file
                let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
                    continue;
                };

                let mut pending = state
                    .uploads
                    .create(&file_name)
                    .await
                    .map_err(upload_error)?;

                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    pending.write_chunk(&chunk).await.map_err(upload_error)?;
                }

                let path = pending.finish().await.map_err(upload_error)?;
                tracing::debug!(file = %path.display(), "Saved upload");
                saved_path = Some(path);
            }
            TABLE_NAME_FIELD if table_name.is_none() => {
                table_name = Some(field.text().await.map_err(multipart_error)?);
            }
            COLUMN_NAME_FIELD if column_name.is_none() => {
                column_name = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {
                // Ignore unknown and repeated fields
            }
        }
    }

    let file_path = saved_path
        .ok_or_else(|| ApiError::bad_request(format!("{CSV_FILE_FIELD} field is required")))?;

    let request = UpdateRequest {
        table_name: table_name.unwrap_or_default(),
        file_path,
        column_name: column_name.unwrap_or_default(),
    };

    state
        .updater
        .run(&request)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let page = ResultPage {
        message: UPDATE_SUCCESS_MESSAGE.to_string(),
        has_report: true,
        report_filename: state.config.report_filename().unwrap_or_default(),
    };

    let html = state
        .templates
        .render(RESULT_TEMPLATE, page)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Html(html))
}

/// Route: any method other than POST on /upload
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

// ============================================================================
// Helpers
// ============================================================================

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(e.body_text())
    } else {
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    }
}

fn upload_error(e: UploadError) -> ApiError {
    match e {
        UploadError::InvalidName(_) => ApiError::bad_request(e.to_string()),
        UploadError::Io(_) => ApiError::internal(e.to_string()),
    }
}
