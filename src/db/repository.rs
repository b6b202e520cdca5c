//! SQLite-backed row store.
//!
//! Uses prepared statements; uniqueness and referential integrity are left to
//! the schema constraints and surface through `From<sqlx::Error> for AppError`.

use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::Store;
use crate::errors::AppError;
use crate::models::{
    Attendance, AttendanceChanges, AttendanceStatus, Gender, Member, MemberFields,
    MemberSnapshot, NewAttendance, RoleCategory,
};

const MEMBER_COLUMNS: &str =
    "id, name, birthplace, birth_date, gender, role_category, created_at, updated_at";

const ATTENDANCE_SELECT: &str = r#"
    SELECT a.id, a.member_id, a.date, a.status, a.reason, a.created_at, a.updated_at,
           m.name AS member_name, m.role_category AS member_role_category
    FROM attendance a
    LEFT JOIN members m ON m.id = a.member_id"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Fixed-width UTC timestamp so text ordering matches time ordering.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl Store for Repository {
    // ==================== MEMBER OPERATIONS ====================

    async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members ORDER BY name COLLATE NOCASE, created_at",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(member_from_row).collect()
    }

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn insert_member(&self, fields: &MemberFields) -> Result<Member, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO members (id, name, birthplace, birth_date, gender, role_category, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.birthplace)
        .bind(fields.birth_date)
        .bind(fields.gender.as_str())
        .bind(fields.role_category.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(member_id = %id, "Member created");

        Ok(Member {
            id,
            name: fields.name.clone(),
            birthplace: fields.birthplace.clone(),
            birth_date: fields.birth_date,
            gender: fields.gender,
            role_category: fields.role_category,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update_member(&self, id: &str, fields: &MemberFields) -> Result<Member, AppError> {
        let now = timestamp();

        let result = sqlx::query(
            "UPDATE members SET name = ?, birthplace = ?, birth_date = ?, gender = ?, role_category = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&fields.name)
        .bind(&fields.birthplace)
        .bind(fields.birth_date)
        .bind(fields.gender.as_str())
        .bind(fields.role_category.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        // Re-read so created_at comes from the store
        self.get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        tracing::info!(member_id = %id, "Member deleted");
        Ok(())
    }

    // ==================== ATTENDANCE OPERATIONS ====================

    async fn list_attendance_by_date(&self, date: NaiveDate) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query(&format!(
            "{} WHERE a.date = ? ORDER BY a.created_at DESC, a.rowid DESC",
            ATTENDANCE_SELECT
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attendance_from_row).collect()
    }

    async fn get_attendance(&self, id: &str) -> Result<Option<Attendance>, AppError> {
        let row = sqlx::query(&format!("{} WHERE a.id = ?", ATTENDANCE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(attendance_from_row).transpose()
    }

    async fn insert_attendance(&self, fields: &NewAttendance) -> Result<Attendance, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO attendance (id, member_id, date, status, reason, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&fields.member_id)
        .bind(fields.date)
        .bind(fields.status.as_str())
        .bind(&fields.reason)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(attendance_id = %id, member_id = %fields.member_id, date = %fields.date, "Attendance recorded");

        self.get_attendance(&id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Attendance {} vanished after insert", id)))
    }

    async fn update_attendance(
        &self,
        id: &str,
        changes: &AttendanceChanges,
    ) -> Result<Attendance, AppError> {
        let now = timestamp();

        let result =
            sqlx::query("UPDATE attendance SET status = ?, reason = ?, updated_at = ? WHERE id = ?")
                .bind(changes.status.as_str())
                .bind(&changes.reason)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Attendance {} not found", id)));
        }

        self.get_attendance(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance {} not found", id)))
    }

    async fn delete_attendance(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Attendance {} not found", id)));
        }

        tracing::info!(attendance_id = %id, "Attendance deleted");
        Ok(())
    }
}

// Helper functions for row conversion

fn member_from_row(row: &SqliteRow) -> Result<Member, AppError> {
    let gender: String = row.try_get("gender")?;
    let role_category: String = row.try_get("role_category")?;

    Ok(Member {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        birthplace: row.try_get("birthplace")?,
        birth_date: row.try_get("birth_date")?,
        gender: Gender::parse(&gender).ok_or_else(|| corrupt("gender", &gender))?,
        role_category: RoleCategory::parse(&role_category)
            .ok_or_else(|| corrupt("role_category", &role_category))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn attendance_from_row(row: &SqliteRow) -> Result<Attendance, AppError> {
    let member_id: String = row.try_get("member_id")?;
    let status: String = row.try_get("status")?;
    let member_name: Option<String> = row.try_get("member_name")?;
    let member_role: Option<String> = row.try_get("member_role_category")?;

    let member = match (member_name, member_role) {
        (Some(name), Some(role)) => Some(MemberSnapshot {
            id: member_id.clone(),
            name,
            role_category: RoleCategory::parse(&role)
                .ok_or_else(|| corrupt("role_category", &role))?,
        }),
        _ => None,
    };

    Ok(Attendance {
        id: row.try_get("id")?,
        member_id,
        date: row.try_get("date")?,
        status: AttendanceStatus::parse(&status).ok_or_else(|| corrupt("status", &status))?,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        member,
    })
}

fn corrupt(column: &str, value: &str) -> AppError {
    tracing::error!("Unexpected value {:?} in column {}", value, column);
    AppError::Database(format!("Unexpected value {:?} in column {}", value, column))
}
