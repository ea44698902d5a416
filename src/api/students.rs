//! Student CRUD handlers for rosterd
//!
//! Handlers run the validator-derive checks on inbound payloads for
//! per-field fail-fast feedback, then hand off to the record service, which
//! re-validates through the same shared rules before anything is persisted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::server::AppState,
    error::{Error, Result},
    models::{District, NewStudent, StudentRecord, StudentUpdate, ValidationErrors},
};

/// Query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring matched against code, names, city, district
    pub search: Option<String>,
}

/// `POST /api/students`
pub async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<NewStudent>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| Error::Validation(ValidationErrors::from(e)))?;

    let student = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /api/students?search=`
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StudentRecord>>> {
    let students = state.service.list(params.search.as_deref()).await?;
    Ok(Json(students))
}

/// `GET /api/students/:id`
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentRecord>> {
    let student = state.service.get(id).await?;
    Ok(Json(student))
}

/// `PUT /api/students/:id`
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<StudentRecord>> {
    payload
        .validate()
        .map_err(|e| Error::Validation(ValidationErrors::from(e)))?;

    let student = state.service.update(id, payload).await?;
    Ok(Json(student))
}

/// `DELETE /api/students/:id`
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student = state.service.delete(id).await?;
    Ok(Json(json!({
        "message": "Student deleted successfully",
        "student": student,
    })))
}

/// `GET /api/districts`
///
/// The same closed enumeration the validator enforces, for form dropdowns.
pub async fn list_districts() -> Json<Vec<&'static str>> {
    Json(District::names())
}
