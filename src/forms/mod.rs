//! Form validation and submission.
//!
//! Both the REST handlers and the dashboard dialogs go through these
//! functions, so a form that fails validation never reaches the store.

use chrono::NaiveDate;

use crate::db::Store;
use crate::errors::AppError;
use crate::models::{
    Attendance, AttendanceChanges, AttendanceForm, Member, MemberFields, MemberForm,
    NewAttendance,
};

/// Which record a submission targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update { id: String },
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{} must be a valid date (YYYY-MM-DD)", field))
    })
}

fn required(value: &str, message: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Blank reasons are stored as `NULL`.
fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// Every member field is required.
pub fn validate_member(form: &MemberForm) -> Result<MemberFields, AppError> {
    let name = required(&form.name, "Name is required")?;
    let birthplace = required(&form.birthplace, "Birthplace is required")?;
    let birth_date = required(&form.birth_date, "Birth date is required")?;
    let birth_date = parse_date(&birth_date, "Birth date")?;
    let gender = form
        .gender
        .ok_or_else(|| AppError::Validation("Gender is required".to_string()))?;
    let role_category = form
        .role_category
        .ok_or_else(|| AppError::Validation("Role category is required".to_string()))?;

    Ok(MemberFields {
        name,
        birthplace,
        birth_date,
        gender,
        role_category,
    })
}

fn check_reason(form: &AttendanceForm) -> Result<Option<String>, AppError> {
    let reason = normalize_reason(form.reason.as_deref());
    if form.status.requires_reason() && reason.is_none() {
        return Err(AppError::Validation(format!(
            "A reason is required when status is {}",
            form.status.as_str()
        )));
    }
    Ok(reason)
}

/// Validate a new attendance entry. `default_date` fills in a missing date.
pub fn validate_new_attendance(
    form: &AttendanceForm,
    default_date: Option<NaiveDate>,
) -> Result<NewAttendance, AppError> {
    let member_id = required(&form.member_id, "Member is required")?;

    let date = match form.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_date(raw, "Date")?,
        None => default_date
            .ok_or_else(|| AppError::Validation("Date is required".to_string()))?,
    };

    let reason = check_reason(form)?;

    Ok(NewAttendance {
        member_id,
        date,
        status: form.status,
        reason,
    })
}

/// Validate an edit of `existing`. Member and date are fixed once recorded.
pub fn validate_attendance_edit(
    form: &AttendanceForm,
    existing: &Attendance,
) -> Result<AttendanceChanges, AppError> {
    let member_id = form.member_id.trim();
    if !member_id.is_empty() && member_id != existing.member_id {
        return Err(AppError::Validation(
            "Member cannot be changed once attendance is recorded".to_string(),
        ));
    }

    if let Some(raw) = form.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        if parse_date(raw, "Date")? != existing.date {
            return Err(AppError::Validation(
                "Date cannot be changed once attendance is recorded".to_string(),
            ));
        }
    }

    let reason = check_reason(form)?;

    Ok(AttendanceChanges {
        status: form.status,
        reason,
    })
}

/// Validate and persist a member form.
pub async fn submit_member(
    store: &dyn Store,
    mode: &SubmitMode,
    form: &MemberForm,
) -> Result<Member, AppError> {
    let fields = validate_member(form)?;

    match mode {
        SubmitMode::Create => store.insert_member(&fields).await,
        SubmitMode::Update { id } => store.update_member(id, &fields).await,
    }
}

/// Validate and persist an attendance form.
pub async fn submit_attendance(
    store: &dyn Store,
    mode: &SubmitMode,
    form: &AttendanceForm,
    default_date: Option<NaiveDate>,
) -> Result<Attendance, AppError> {
    match mode {
        SubmitMode::Create => {
            let fields = validate_new_attendance(form, default_date)?;
            let result = store.insert_attendance(&fields).await;
            if let Err(AppError::Duplicate) = &result {
                tracing::debug!(
                    member_id = %fields.member_id,
                    date = %fields.date,
                    "Rejected duplicate attendance"
                );
            }
            result
        }
        SubmitMode::Update { id } => {
            let existing = store
                .get_attendance(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Attendance {} not found", id)))?;
            let changes = validate_attendance_edit(form, &existing)?;
            store.update_attendance(id, &changes).await
        }
    }
}
