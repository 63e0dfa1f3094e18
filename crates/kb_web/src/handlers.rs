use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kb_core::{SearchRecord, Summary};
use serde::{Deserialize, Serialize};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Plain-text error body with the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message }
    }

    fn internal(message: &'static str) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn search_query(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Summary>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected search request body: {}", e);
        ApiError::bad_request("invalid json")
    })?;

    match state.service.search(&request.query).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) if e.is_input_error() => Err(ApiError::bad_request("query cannot be empty")),
        // details are logged by the service
        Err(_) => Err(ApiError::internal("internal ai error")),
    }
}

pub async fn list_searches(
    State(state): State<AppState>,
) -> Result<Json<Vec<SearchRecord>>, ApiError> {
    state.service.history().map(Json).map_err(|e| {
        tracing::error!("Failed to list searches: {}", e);
        ApiError::internal("internal storage error")
    })
}

pub async fn clear_searches(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.service.clear_history().map_err(|e| {
        tracing::error!("Failed to clear searches: {}", e);
        ApiError::internal("internal storage error")
    })?;
    Ok(StatusCode::NO_CONTENT)
}
