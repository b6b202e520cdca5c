//! Dashboard page handlers.
//!
//! Every handler answers with the page state after the action, wrapped in
//! the usual response envelope.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Extension,
};
use serde::Deserialize;

use super::directory::{self, MemberDirectory, MembersPage};
use super::register::{self, AttendancePage, AttendanceRegister};
use crate::api::{success, today, ApiResult, AppJson, DateQuery};
use crate::auth::{Identity, LOGIN_PATH};
use crate::errors::AppError;
use crate::forms::parse_date;
use crate::models::{AttendanceForm, MemberForm};
use crate::AppState;

/// Body of `POST /dashboard/absensi/date`.
#[derive(Debug, Deserialize)]
pub struct DateChange {
    pub date: String,
}

async fn with_directory(
    state: &AppState,
    identity: &Identity,
    action: impl FnOnce(&mut MemberDirectory) -> Result<(), AppError>,
) -> ApiResult<MembersPage> {
    let session = state.sessions.directory(identity).await;
    let mut directory = session.lock().await;
    action(&mut directory)?;
    success(directory.view())
}

async fn with_register(
    state: &AppState,
    identity: &Identity,
    action: impl FnOnce(&mut AttendanceRegister) -> Result<(), AppError>,
) -> ApiResult<AttendancePage> {
    let session = state.sessions.register(identity, today()).await;
    let mut register = session.lock().await;
    action(&mut register)?;
    success(register.view())
}

// Members

/// GET /dashboard
pub async fn members_page(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<MembersPage> {
    let session = state.sessions.directory(&identity).await;
    success(directory::load(&session, state.store.as_ref()).await)
}

pub async fn open_member_add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<MembersPage> {
    with_directory(&state, &identity, |d| d.open_add()).await
}

pub async fn open_member_edit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<MembersPage> {
    with_directory(&state, &identity, |d| d.open_edit(&id)).await
}

pub async fn close_member_dialog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<MembersPage> {
    with_directory(&state, &identity, |d| {
        d.close_dialog();
        Ok(())
    })
    .await
}

pub async fn submit_member_dialog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(form): AppJson<MemberForm>,
) -> ApiResult<MembersPage> {
    let session = state.sessions.directory(&identity).await;
    success(directory::submit(&session, state.store.as_ref(), form).await?)
}

pub async fn request_member_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<MembersPage> {
    with_directory(&state, &identity, |d| d.request_delete(&id)).await
}

pub async fn cancel_member_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<MembersPage> {
    with_directory(&state, &identity, |d| {
        d.cancel_delete();
        Ok(())
    })
    .await
}

pub async fn confirm_member_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<MembersPage> {
    let session = state.sessions.directory(&identity).await;
    success(directory::confirm_delete(&session, state.store.as_ref()).await?)
}

// Attendance

/// GET /dashboard/absensi?date=
pub async fn attendance_page(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DateQuery>,
) -> ApiResult<AttendancePage> {
    let date = query.resolve()?;
    let session = state.sessions.register(&identity, date).await;
    success(register::load(&session, state.store.as_ref(), date).await)
}

pub async fn change_attendance_date(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(change): AppJson<DateChange>,
) -> ApiResult<AttendancePage> {
    let date = parse_date(&change.date, "Date")?;
    let session = state.sessions.register(&identity, date).await;
    success(register::change_date(&session, state.store.as_ref(), date).await)
}

pub async fn open_attendance_add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<AttendancePage> {
    with_register(&state, &identity, |r| r.open_add()).await
}

pub async fn open_attendance_edit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<AttendancePage> {
    with_register(&state, &identity, |r| r.open_edit(&id)).await
}

pub async fn close_attendance_dialog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<AttendancePage> {
    with_register(&state, &identity, |r| {
        r.close_dialog();
        Ok(())
    })
    .await
}

pub async fn submit_attendance_dialog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(form): AppJson<AttendanceForm>,
) -> ApiResult<AttendancePage> {
    let session = state.sessions.register(&identity, today()).await;
    success(register::submit(&session, state.store.as_ref(), form).await?)
}

pub async fn request_attendance_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<AttendancePage> {
    with_register(&state, &identity, |r| r.request_delete(&id)).await
}

pub async fn cancel_attendance_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<AttendancePage> {
    with_register(&state, &identity, |r| {
        r.cancel_delete();
        Ok(())
    })
    .await
}

pub async fn confirm_attendance_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<AttendancePage> {
    let session = state.sessions.register(&identity, today()).await;
    success(register::confirm_delete(&session, state.store.as_ref()).await?)
}

// Session

/// POST /dashboard/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Redirect {
    state.sessions.end(&identity).await;
    tracing::info!(user = %identity.user_id, "Signed out");
    Redirect::to(LOGIN_PATH)
}

/// GET /login
pub async fn login_page() -> &'static str {
    "Sign in with your identity provider, then send the issued token in the x-api-key header."
}
