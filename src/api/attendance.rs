//! Attendance API endpoints.

use axum::extract::{Path, Query, State};

use super::{success, ApiResult, AppJson, DateQuery, DeleteQuery};
use crate::dashboard::{compute_stats, AttendanceStats};
use crate::errors::AppError;
use crate::forms::{submit_attendance, SubmitMode};
use crate::models::{Attendance, AttendanceForm};
use crate::AppState;

/// GET /api/attendance?date= - Rows for one date, newest first.
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Vec<Attendance>> {
    let date = query.resolve()?;
    success(state.store.list_attendance_by_date(date).await?)
}

/// GET /api/attendance/stats?date= - Per-status counts for one date.
pub async fn attendance_stats(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<AttendanceStats> {
    let date = query.resolve()?;
    let records = state.store.list_attendance_by_date(date).await?;
    success(compute_stats(&records))
}

/// GET /api/attendance/:id
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Attendance> {
    match state.store.get_attendance(&id).await? {
        Some(record) => success(record),
        None => Err(AppError::NotFound(format!("Attendance {} not found", id))),
    }
}

/// POST /api/attendance?date= - Record attendance. The query date fills in
/// a missing `date` field.
pub async fn create_attendance(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
    AppJson(form): AppJson<AttendanceForm>,
) -> ApiResult<Attendance> {
    let default_date = query.resolve()?;
    let record = submit_attendance(
        state.store.as_ref(),
        &SubmitMode::Create,
        &form,
        Some(default_date),
    )
    .await?;
    success(record)
}

/// PUT /api/attendance/:id - Change status and reason.
pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(form): AppJson<AttendanceForm>,
) -> ApiResult<Attendance> {
    let record =
        submit_attendance(state.store.as_ref(), &SubmitMode::Update { id }, &form, None).await?;
    success(record)
}

/// DELETE /api/attendance/:id?confirm=true
pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<()> {
    query.require()?;
    state.store.delete_attendance(&id).await?;
    success(())
}
