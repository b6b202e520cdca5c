//! In-memory row store for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::repository::timestamp;
use super::Store;
use crate::errors::AppError;
use crate::models::{
    Attendance, AttendanceChanges, Member, MemberFields, MemberSnapshot, NewAttendance,
};

#[derive(Default)]
struct Tables {
    members: Vec<Member>,
    /// Insertion order doubles as creation order.
    attendance: Vec<Attendance>,
}

/// Store that keeps both tables in memory and mirrors the SQLite constraints.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every list/get call fail with a database error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every insert/update/delete call fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database error: connection refused".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database error: database is locked".to_string()));
        }
        Ok(())
    }
}

fn with_member(mut record: Attendance, members: &[Member]) -> Attendance {
    record.member = members
        .iter()
        .find(|m| m.id == record.member_id)
        .map(|m| MemberSnapshot {
            id: m.id.clone(),
            name: m.name.clone(),
            role_category: m.role_category,
        });
    record
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        self.check_read()?;
        let tables = self.tables.read().await;
        let mut members = tables.members.clone();
        members.sort_by_key(|m| m.name.to_lowercase());
        Ok(members)
    }

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        self.check_read()?;
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_member(&self, fields: &MemberFields) -> Result<Member, AppError> {
        self.check_write()?;
        let now = timestamp();
        let member = Member {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name.clone(),
            birthplace: fields.birthplace.clone(),
            birth_date: fields.birth_date,
            gender: fields.gender,
            role_category: fields.role_category,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tables.write().await.members.push(member.clone());
        Ok(member)
    }

    async fn update_member(&self, id: &str, fields: &MemberFields) -> Result<Member, AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let member = tables
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        member.name = fields.name.clone();
        member.birthplace = fields.birthplace.clone();
        member.birth_date = fields.birth_date;
        member.gender = fields.gender;
        member.role_category = fields.role_category;
        member.updated_at = timestamp();
        Ok(member.clone())
    }

    async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let before = tables.members.len();
        tables.members.retain(|m| m.id != id);
        if tables.members.len() == before {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }
        tables.attendance.retain(|a| a.member_id != id);
        Ok(())
    }

    async fn list_attendance_by_date(&self, date: NaiveDate) -> Result<Vec<Attendance>, AppError> {
        self.check_read()?;
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .iter()
            .rev()
            .filter(|a| a.date == date)
            .map(|a| with_member(a.clone(), &tables.members))
            .collect())
    }

    async fn get_attendance(&self, id: &str) -> Result<Option<Attendance>, AppError> {
        self.check_read()?;
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .iter()
            .find(|a| a.id == id)
            .map(|a| with_member(a.clone(), &tables.members)))
    }

    async fn insert_attendance(&self, fields: &NewAttendance) -> Result<Attendance, AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;

        if !tables.members.iter().any(|m| m.id == fields.member_id) {
            return Err(AppError::Validation(
                "Referenced member does not exist".to_string(),
            ));
        }
        if tables
            .attendance
            .iter()
            .any(|a| a.member_id == fields.member_id && a.date == fields.date)
        {
            return Err(AppError::Duplicate);
        }

        let now = timestamp();
        let record = Attendance {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: fields.member_id.clone(),
            date: fields.date,
            status: fields.status,
            reason: fields.reason.clone(),
            created_at: now.clone(),
            updated_at: now,
            member: None,
        };
        tables.attendance.push(record.clone());
        Ok(with_member(record, &tables.members))
    }

    async fn update_attendance(
        &self,
        id: &str,
        changes: &AttendanceChanges,
    ) -> Result<Attendance, AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let record = tables
            .attendance
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Attendance {} not found", id)))?;

        record.status = changes.status;
        record.reason = changes.reason.clone();
        record.updated_at = timestamp();
        let record = record.clone();
        Ok(with_member(record, &tables.members))
    }

    async fn delete_attendance(&self, id: &str) -> Result<(), AppError> {
        self.check_write()?;
        let mut tables = self.tables.write().await;
        let before = tables.attendance.len();
        tables.attendance.retain(|a| a.id != id);
        if tables.attendance.len() == before {
            return Err(AppError::NotFound(format!("Attendance {} not found", id)));
        }
        Ok(())
    }
}
