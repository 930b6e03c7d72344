use crate::error::AppResult;
use crate::routes::types::HealthCheckResponse;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use super::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let students = state.students.count().await?;

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        base_path: state.settings.base_path().to_string(),
        students,
        timestamp: chrono::Utc::now(),
    };

    Ok(Json(response))
}
