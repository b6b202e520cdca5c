//! Edit dialog state shared by the member and attendance pages.

use serde::Serialize;

use crate::errors::AppError;
use crate::forms::SubmitMode;

/// An add/edit dialog holding a form of type `F`.
///
/// `mode == None` means the dialog is closed. While `busy` the submit
/// control is disabled; a second submit is rejected.
#[derive(Debug, Clone, Default)]
pub struct Dialog<F> {
    mode: Option<SubmitMode>,
    form: F,
    busy: bool,
    error: Option<String>,
}

/// Serializable snapshot of an open dialog.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DialogView<F: Serialize> {
    pub mode: &'static str,
    pub record_id: Option<String>,
    pub form: F,
    pub busy: bool,
    pub error: Option<String>,
}

impl<F: Clone + Default + Serialize> Dialog<F> {
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn open_add(&mut self, form: F) -> Result<(), AppError> {
        self.open(SubmitMode::Create, form)
    }

    pub fn open_edit(&mut self, id: &str, form: F) -> Result<(), AppError> {
        self.open(SubmitMode::Update { id: id.to_string() }, form)
    }

    /// Like `close`, refused while a submit is in flight.
    fn open(&mut self, mode: SubmitMode, form: F) -> Result<(), AppError> {
        if self.busy {
            return Err(AppError::BadRequest(
                "A submission is already in progress".to_string(),
            ));
        }
        self.mode = Some(mode);
        self.form = form;
        self.error = None;
        Ok(())
    }

    /// Close and reset. A dialog in the middle of a submit stays open.
    pub fn close(&mut self) -> bool {
        if self.busy {
            return false;
        }
        *self = Self {
            mode: None,
            form: F::default(),
            busy: false,
            error: None,
        };
        true
    }

    /// Take the posted form and enter the busy state.
    pub fn begin_submit(&mut self, form: F) -> Result<SubmitMode, AppError> {
        let mode = self
            .mode
            .clone()
            .ok_or_else(|| AppError::BadRequest("No dialog is open".to_string()))?;
        if self.busy {
            return Err(AppError::BadRequest(
                "A submission is already in progress".to_string(),
            ));
        }
        self.form = form;
        self.busy = true;
        self.error = None;
        Ok(mode)
    }

    /// Leave the busy state. Success closes the dialog; failure keeps the
    /// form and shows the error text until the next submit or close.
    pub fn finish<T>(&mut self, result: Result<T, AppError>) -> Option<T> {
        self.busy = false;
        match result {
            Ok(record) => {
                self.close();
                Some(record)
            }
            Err(err) => {
                self.error = Some(err.message());
                None
            }
        }
    }

    pub fn view(&self) -> Option<DialogView<F>> {
        let mode = self.mode.as_ref()?;
        let (label, record_id) = match mode {
            SubmitMode::Create => ("create", None),
            SubmitMode::Update { id } => ("edit", Some(id.clone())),
        };
        Some(DialogView {
            mode: label,
            record_id,
            form: self.form.clone(),
            busy: self.busy,
            error: self.error.clone(),
        })
    }
}
