//! Axum route handlers for the Applications API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use reqwest::Url;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Accepts absolute http(s) URLs with a host and returns their normalized form.
pub fn normalize_job_url(raw: &str) -> Result<String, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::UnprocessableEntity(format!("job_url is not a valid URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::UnprocessableEntity(
            "job_url must use http or https".to_string(),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::UnprocessableEntity(
            "job_url must include a host".to_string(),
        ));
    }

    Ok(url.to_string())
}

/// POST /apply
///
/// Creates a Pending application and starts its workflow in the background.
/// Poll GET /applications/:id for progress.
pub async fn handle_apply(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let Json(request) = payload?;
    let job_url = normalize_job_url(&request.job_url)?;
    let record = state.applications.submit(&job_url).await?;
    Ok(Json(record))
}

/// GET /applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    Ok(Json(state.store.list(limit).await?))
}

/// GET /applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.store.get(id).await?))
}
