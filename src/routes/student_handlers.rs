use crate::error::{AppError, AppResult};
use crate::models::Student;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use super::extract::{AppJson, AppPath};
use super::AppState;

/// List every student as a plain array
pub async fn get_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Student>>> {
    let students = state.students.find_all().await?;
    Ok(Json(students))
}

/// Create a student, or update it when the payload carries a known id.
///
/// An unknown id is dropped and a fresh one assigned.
pub async fn save(
    State(state): State<Arc<AppState>>,
    AppJson(mut student): AppJson<Student>,
) -> AppResult<Json<Student>> {
    student.validate()?;

    if let Some(id) = student.id {
        if !state.students.exists_by_id(id).await? {
            tracing::debug!(id, "Saving student with unknown id as a new record");
            student.id = None;
        }
    }

    let saved = state.students.save(student).await?;
    tracing::info!(id = ?saved.id, "Saved student");

    Ok(Json(saved))
}

/// Delete a student by id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !state.students.delete_by_id(id).await? {
        return Err(AppError::not_found("Student", id));
    }

    tracing::info!(id, "Deleted student");
    Ok(StatusCode::NO_CONTENT)
}
