//! Attendance register: one date's attendance rows, the member selector,
//! statistics, the dialog and the delete prompt.

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;

use super::collection::{reconcile, remove};
use super::dialog::{Dialog, DialogView};
use super::list::{attendance_rows, AttendanceRow, DeleteConfirmation, EMPTY_ATTENDANCE_MESSAGE};
use super::stats::{compute_stats, AttendanceStats};
use crate::db::Store;
use crate::errors::AppError;
use crate::forms::{self, SubmitMode};
use crate::models::{Attendance, AttendanceForm, Member, MemberOption};

pub const LOAD_FAILED_NOTICE: &str = "Gagal memuat data absensi. Silakan coba lagi.";
pub const MEMBERS_FAILED_NOTICE: &str = "Gagal memuat daftar anggota.";

/// Identifies one date fetch. Only the latest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub date: NaiveDate,
}

/// Page state for `/dashboard/absensi`.
#[derive(Debug, Clone, Serialize)]
pub struct AttendancePage {
    pub date: NaiveDate,
    pub loading: bool,
    pub stats: AttendanceStats,
    pub rows: Vec<AttendanceRow>,
    pub empty_message: Option<&'static str>,
    pub notice: Option<String>,
    pub member_options: Vec<MemberOption>,
    pub dialog: Option<DialogView<AttendanceForm>>,
    pub pending_delete: Option<String>,
    pub deleting: bool,
}

#[derive(Debug)]
pub struct AttendanceRegister {
    date: NaiveDate,
    generation: u64,
    loading: bool,
    records: Vec<Attendance>,
    member_options: Vec<MemberOption>,
    notice: Option<String>,
    dialog: Dialog<AttendanceForm>,
    delete: DeleteConfirmation,
}

impl AttendanceRegister {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            generation: 0,
            loading: false,
            records: Vec::new(),
            member_options: Vec::new(),
            notice: None,
            dialog: Dialog::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Attendance] {
        &self.records
    }

    pub fn stats(&self) -> AttendanceStats {
        compute_stats(&self.records)
    }

    /// Switch to `date` and enter the loading state. The previous date's
    /// rows stay in place until the fetch for this ticket lands.
    pub fn select_date(&mut self, date: NaiveDate) -> FetchTicket {
        self.generation += 1;
        self.date = date;
        self.loading = true;
        self.delete = DeleteConfirmation::default();
        FetchTicket {
            generation: self.generation,
            date,
        }
    }

    /// Apply a date fetch. Returns `false` when the ticket is stale and the
    /// result was discarded.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Attendance>, AppError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = %ticket.date,
                current = %self.date,
                "Discarding stale attendance fetch"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                self.notice = None;
            }
            Err(err) => {
                tracing::warn!(date = %ticket.date, "Failed to load attendance: {}", err);
                self.records.clear();
                self.notice = Some(LOAD_FAILED_NOTICE.to_string());
            }
        }
        true
    }

    pub fn apply_members(&mut self, result: Result<Vec<Member>, AppError>) {
        match result {
            Ok(members) => self.member_options = members.iter().map(MemberOption::from).collect(),
            Err(err) => {
                tracing::warn!("Failed to load member options: {}", err);
                self.member_options.clear();
                self.notice = Some(MEMBERS_FAILED_NOTICE.to_string());
            }
        }
    }

    pub fn open_add(&mut self) -> Result<(), AppError> {
        self.dialog.open_add(AttendanceForm {
            date: Some(self.date.to_string()),
            ..AttendanceForm::default()
        })
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Attendance {} not found", id)))?;
        self.dialog.open_edit(id, AttendanceForm::from(record))
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
    }

    pub fn begin_submit(&mut self, form: AttendanceForm) -> Result<SubmitMode, AppError> {
        self.dialog.begin_submit(form)
    }

    /// Merge the saved row if it belongs to the displayed date.
    pub fn finish_submit(&mut self, result: Result<Attendance, AppError>) {
        if let Some(record) = self.dialog.finish(result) {
            if record.date == self.date {
                self.records = reconcile(std::mem::take(&mut self.records), record);
            }
        }
    }

    pub fn request_delete(&mut self, id: &str) -> Result<(), AppError> {
        if !self.records.iter().any(|r| r.id == id) {
            return Err(AppError::NotFound(format!("Attendance {} not found", id)));
        }
        self.delete.request(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    pub fn begin_delete(&mut self) -> Option<String> {
        self.delete.begin()
    }

    pub fn finish_delete(&mut self, id: &str, result: Result<(), AppError>) {
        self.delete.finish();
        match result {
            Ok(()) => self.records = remove(std::mem::take(&mut self.records), id),
            Err(err) => {
                tracing::warn!(attendance_id = %id, "Failed to delete attendance: {}", err);
                self.notice = Some(format!("Gagal menghapus absensi: {}", err.message()));
            }
        }
    }

    pub fn view(&self) -> AttendancePage {
        AttendancePage {
            date: self.date,
            loading: self.loading,
            stats: self.stats(),
            rows: attendance_rows(&self.records),
            empty_message: (!self.loading && self.records.is_empty())
                .then_some(EMPTY_ATTENDANCE_MESSAGE),
            notice: self.notice.clone(),
            member_options: self.member_options.clone(),
            dialog: self.dialog.view(),
            pending_delete: self.delete.pending.clone(),
            deleting: self.delete.deleting,
        }
    }
}

/// Fetch the member selector and the rows for `date`.
pub async fn load(
    session: &Mutex<AttendanceRegister>,
    store: &dyn Store,
    date: NaiveDate,
) -> AttendancePage {
    let ticket = session.lock().await.select_date(date);
    let members = store.list_members().await;
    let records = store.list_attendance_by_date(ticket.date).await;

    let mut register = session.lock().await;
    register.apply_fetch(ticket, records);
    register.apply_members(members);
    register.view()
}

/// Change the displayed date.
pub async fn change_date(
    session: &Mutex<AttendanceRegister>,
    store: &dyn Store,
    date: NaiveDate,
) -> AttendancePage {
    let ticket = session.lock().await.select_date(date);
    let records = store.list_attendance_by_date(ticket.date).await;

    let mut register = session.lock().await;
    register.apply_fetch(ticket, records);
    register.view()
}

/// Submit the open dialog. A missing form date falls back to the displayed date.
pub async fn submit(
    session: &Mutex<AttendanceRegister>,
    store: &dyn Store,
    form: AttendanceForm,
) -> Result<AttendancePage, AppError> {
    let (mode, default_date) = {
        let mut register = session.lock().await;
        (register.begin_submit(form.clone())?, register.date())
    };
    let result = forms::submit_attendance(store, &mode, &form, Some(default_date)).await;

    let mut register = session.lock().await;
    register.finish_submit(result);
    Ok(register.view())
}

/// Run the confirmed delete.
pub async fn confirm_delete(
    session: &Mutex<AttendanceRegister>,
    store: &dyn Store,
) -> Result<AttendancePage, AppError> {
    let id = session
        .lock()
        .await
        .begin_delete()
        .ok_or_else(|| AppError::BadRequest("No delete is awaiting confirmation".to_string()))?;
    let result = store.delete_attendance(&id).await;

    let mut register = session.lock().await;
    register.finish_delete(&id, result);
    Ok(register.view())
}
