//! Row store interface.
//!
//! Handlers and dashboard containers receive an `Arc<dyn Store>` rather than a
//! concrete pool, so tests can substitute the in-memory store.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::{Attendance, AttendanceChanges, Member, MemberFields, NewAttendance};

/// Persistence operations for the `members` and `attendance` tables.
///
/// Implementations must report a (member, date) uniqueness violation as
/// [`AppError::Duplicate`] and an unknown id on update or delete as
/// [`AppError::NotFound`].
#[async_trait]
pub trait Store: Send + Sync {
    /// All members, ordered by name ascending.
    async fn list_members(&self) -> Result<Vec<Member>, AppError>;

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError>;

    async fn insert_member(&self, fields: &MemberFields) -> Result<Member, AppError>;

    async fn update_member(&self, id: &str, fields: &MemberFields) -> Result<Member, AppError>;

    /// Removes the member and, by cascade, its attendance rows.
    async fn delete_member(&self, id: &str) -> Result<(), AppError>;

    /// Attendance rows for exactly `date`, newest first, joined with member fields.
    async fn list_attendance_by_date(&self, date: NaiveDate) -> Result<Vec<Attendance>, AppError>;

    async fn get_attendance(&self, id: &str) -> Result<Option<Attendance>, AppError>;

    async fn insert_attendance(&self, fields: &NewAttendance) -> Result<Attendance, AppError>;

    async fn update_attendance(
        &self,
        id: &str,
        changes: &AttendanceChanges,
    ) -> Result<Attendance, AppError>;

    async fn delete_attendance(&self, id: &str) -> Result<(), AppError>;
}
