use crate::{
    data::student::{Student, StudentPayload},
    error::{ApiJson, ApiResult, CannotUpdateMissingStudentSnafu, MissingStudentSnafu},
    routes::sse::StudentChange,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use snafu::OptionExt;

pub async fn get_students(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    Ok(Json(state.list_all().await?))
}

/// A missing student is a bare 404, unlike delete which explains itself.
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    Ok(match state.find_by_id(&id).await? {
        Some(student) => Json(student).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

pub async fn post_student(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ApiResult<Json<Student>> {
    let student = state.insert(payload).await?;
    info!(id = %student.id, %student, "Created student");

    state.announce(StudentChange::Created(student.clone()));
    Ok(Json(student))
}

/// Updating a student that doesn't exist is a bad request, not a 404.
pub async fn put_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ApiResult<Json<Student>> {
    let student = state
        .replace(&id, payload)
        .await?
        .context(CannotUpdateMissingStudentSnafu { id })?;
    info!(id = %student.id, %student, "Updated student");

    state.announce(StudentChange::Updated(student.clone()));
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    let student = state
        .remove_by_id(&id)
        .await?
        .context(MissingStudentSnafu { id })?;
    info!(id = %student.id, %student, "Deleted student");

    state.announce(StudentChange::Deleted(student.clone()));
    Ok(Json(student))
}
