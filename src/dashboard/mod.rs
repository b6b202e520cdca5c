//! Dashboard page sessions.
//!
//! Each signed-in user gets one member directory and one attendance
//! register. Their state is rebuilt on page entry and patched after
//! mutations; the store stays the source of truth.

mod collection;
mod dialog;
mod directory;
mod list;
mod pages;
mod register;
mod stats;

pub use pages::*;
pub use stats::{compute_stats, AttendanceStats};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::auth::Identity;
use directory::MemberDirectory;
use register::AttendanceRegister;

/// Per-user page state, keyed by the resolved identity.
#[derive(Default)]
pub struct PageSessions {
    directories: Mutex<HashMap<String, Arc<Mutex<MemberDirectory>>>>,
    registers: Mutex<HashMap<String, Arc<Mutex<AttendanceRegister>>>>,
}

impl PageSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn directory(&self, identity: &Identity) -> Arc<Mutex<MemberDirectory>> {
        self.directories
            .lock()
            .await
            .entry(identity.user_id.clone())
            .or_default()
            .clone()
    }

    /// A new register starts on `today`.
    pub async fn register(
        &self,
        identity: &Identity,
        today: NaiveDate,
    ) -> Arc<Mutex<AttendanceRegister>> {
        self.registers
            .lock()
            .await
            .entry(identity.user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(AttendanceRegister::new(today))))
            .clone()
    }

    /// Drop both pages for `identity`.
    pub async fn end(&self, identity: &Identity) {
        self.directories.lock().await.remove(&identity.user_id);
        self.registers.lock().await.remove(&identity.user_id);
        tracing::debug!(user = %identity.user_id, "Ended page sessions");
    }
}
