//! Member API endpoints.

use axum::extract::{Path, Query, State};

use super::{success, ApiResult, AppJson, DeleteQuery};
use crate::errors::AppError;
use crate::forms::{submit_member, SubmitMode};
use crate::models::{Member, MemberForm};
use crate::AppState;

/// GET /api/members - List all members, by name.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    success(state.store.list_members().await?)
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Member> {
    match state.store.get_member(&id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    AppJson(form): AppJson<MemberForm>,
) -> ApiResult<Member> {
    success(submit_member(state.store.as_ref(), &SubmitMode::Create, &form).await?)
}

/// PUT /api/members/:id - Replace a member's fields.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(form): AppJson<MemberForm>,
) -> ApiResult<Member> {
    success(submit_member(state.store.as_ref(), &SubmitMode::Update { id }, &form).await?)
}

/// DELETE /api/members/:id?confirm=true - Delete a member and its attendance.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<()> {
    query.require()?;
    state.store.delete_member(&id).await?;
    success(())
}
