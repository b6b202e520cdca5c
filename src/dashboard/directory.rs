//! Member directory: the member page's collection, dialog and delete prompt.

use serde::Serialize;
use tokio::sync::Mutex;

use super::collection::{reconcile, remove};
use super::dialog::{Dialog, DialogView};
use super::list::{member_rows, DeleteConfirmation, MemberRow, EMPTY_MEMBERS_MESSAGE};
use crate::db::Store;
use crate::errors::AppError;
use crate::forms::{self, SubmitMode};
use crate::models::{Gender, Member, MemberForm, RoleCategory};

pub const LOAD_FAILED_NOTICE: &str = "Gagal memuat data anggota. Silakan coba lagi.";

/// Page state for `/dashboard`.
#[derive(Debug, Clone, Serialize)]
pub struct MembersPage {
    pub total: usize,
    pub rows: Vec<MemberRow>,
    pub empty_message: Option<&'static str>,
    pub notice: Option<String>,
    pub dialog: Option<DialogView<MemberForm>>,
    pub pending_delete: Option<String>,
    pub deleting: bool,
}

#[derive(Debug, Default)]
pub struct MemberDirectory {
    members: Vec<Member>,
    notice: Option<String>,
    dialog: Dialog<MemberForm>,
    delete: DeleteConfirmation,
}

impl MemberDirectory {
    #[cfg(test)]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Replace the collection with a fresh fetch. A failed fetch shows an
    /// empty list and a notice.
    pub fn apply_load(&mut self, result: Result<Vec<Member>, AppError>) {
        match result {
            Ok(members) => {
                self.members = members;
                self.notice = None;
            }
            Err(err) => {
                tracing::warn!("Failed to load members: {}", err);
                self.members.clear();
                self.notice = Some(LOAD_FAILED_NOTICE.to_string());
            }
        }
    }

    pub fn open_add(&mut self) -> Result<(), AppError> {
        self.dialog.open_add(MemberForm {
            gender: Some(Gender::Male),
            role_category: Some(RoleCategory::Administrator),
            ..MemberForm::default()
        })
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let member = self
            .members
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;
        self.dialog.open_edit(id, MemberForm::from(member))
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
    }

    pub fn begin_submit(&mut self, form: MemberForm) -> Result<SubmitMode, AppError> {
        self.dialog.begin_submit(form)
    }

    pub fn finish_submit(&mut self, result: Result<Member, AppError>) {
        if let Some(member) = self.dialog.finish(result) {
            self.members = reconcile(std::mem::take(&mut self.members), member);
        }
    }

    pub fn request_delete(&mut self, id: &str) -> Result<(), AppError> {
        if !self.members.iter().any(|m| m.id == id) {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
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
            Ok(()) => {
                self.members = remove(std::mem::take(&mut self.members), id);
                self.notice = None;
            }
            Err(err) => {
                tracing::warn!(member_id = %id, "Failed to delete member: {}", err);
                self.notice = Some(format!("Gagal menghapus anggota: {}", err.message()));
            }
        }
    }

    pub fn view(&self) -> MembersPage {
        MembersPage {
            total: self.members.len(),
            rows: member_rows(&self.members),
            empty_message: self.members.is_empty().then_some(EMPTY_MEMBERS_MESSAGE),
            notice: self.notice.clone(),
            dialog: self.dialog.view(),
            pending_delete: self.delete.pending.clone(),
            deleting: self.delete.deleting,
        }
    }
}

// The session lock is released while the store call is in flight.

/// Fetch every member and rebuild the collection.
pub async fn load(session: &Mutex<MemberDirectory>, store: &dyn Store) -> MembersPage {
    let result = store.list_members().await;
    let mut directory = session.lock().await;
    directory.apply_load(result);
    directory.view()
}

/// Submit the open dialog.
pub async fn submit(
    session: &Mutex<MemberDirectory>,
    store: &dyn Store,
    form: MemberForm,
) -> Result<MembersPage, AppError> {
    let mode = session.lock().await.begin_submit(form.clone())?;
    let result = forms::submit_member(store, &mode, &form).await;

    let mut directory = session.lock().await;
    directory.finish_submit(result);
    Ok(directory.view())
}

/// Run the confirmed delete.
pub async fn confirm_delete(
    session: &Mutex<MemberDirectory>,
    store: &dyn Store,
) -> Result<MembersPage, AppError> {
    let id = session
        .lock()
        .await
        .begin_delete()
        .ok_or_else(|| AppError::BadRequest("No delete is awaiting confirmation".to_string()))?;
    let result = store.delete_member(&id).await;

    let mut directory = session.lock().await;
    directory.finish_delete(&id, result);
    Ok(directory.view())
}
