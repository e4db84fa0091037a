use axum::extract::State;
use axum::response::Html;
use serde::Serialize;
use std::sync::Arc;

use super::INDEX_TEMPLATE;
use crate::api::response::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub tables: Vec<String>,
}

/// Landing page: the database's tables, freshly queried on every request.
/// Route: GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let tables = state
        .catalog
        .table_names()
        .await
        .map_err(|e| ApiError::internal(format!("Error getting table names: {e}")))?;

    let html = state
        .templates
        .render(INDEX_TEMPLATE, IndexPage { tables })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Html(html))
}
