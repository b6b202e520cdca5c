//! Row rendering for the member and attendance tables, plus the delete confirmation step.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Attendance, Member};

pub const EMPTY_MEMBERS_MESSAGE: &str =
    "Belum ada data anggota. Klik tombol \"Tambah Anggota\" untuk menambahkan.";
pub const EMPTY_ATTENDANCE_MESSAGE: &str = "Belum ada data absensi untuk tanggal ini.";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `1 Januari 1990`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberRow {
    pub number: usize,
    pub id: String,
    pub name: String,
    /// Birthplace and long-form birth date, e.g. `Jakarta, 1 Januari 1990`.
    pub birth: String,
    pub gender: &'static str,
    pub role_category: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceRow {
    pub number: usize,
    pub id: String,
    pub member_name: String,
    pub role_category: String,
    pub status: &'static str,
    pub reason: String,
}

pub fn member_rows(members: &[Member]) -> Vec<MemberRow> {
    members
        .iter()
        .enumerate()
        .map(|(index, member)| MemberRow {
            number: index + 1,
            id: member.id.clone(),
            name: member.name.clone(),
            birth: format!(
                "{}, {}",
                member.birthplace,
                format_long_date(member.birth_date)
            ),
            gender: member.gender.label(),
            role_category: member.role_category.label(),
        })
        .collect()
}

pub fn attendance_rows(records: &[Attendance]) -> Vec<AttendanceRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let (member_name, role_category) = match &record.member {
                Some(member) => (member.name.clone(), member.role_category.label().to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            AttendanceRow {
                number: index + 1,
                id: record.id.clone(),
                member_name,
                role_category,
                status: record.status.label(),
                reason: record.reason.clone().unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

/// Pending delete for a list: a row id awaiting explicit confirmation.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DeleteConfirmation {
    pub pending: Option<String>,
    pub deleting: bool,
}

impl DeleteConfirmation {
    /// Ask for confirmation. Ignored while a delete is already in flight.
    pub fn request(&mut self, id: &str) {
        if !self.deleting {
            self.pending = Some(id.to_string());
        }
    }

    pub fn cancel(&mut self) {
        if !self.deleting {
            self.pending = None;
        }
    }

    /// Acknowledge the confirmation. Returns the id to delete, if any.
    pub fn begin(&mut self) -> Option<String> {
        if self.deleting {
            return None;
        }
        let id = self.pending.clone()?;
        self.deleting = true;
        Some(id)
    }

    /// The delete call returned; the prompt closes either way.
    pub fn finish(&mut self) {
        self.deleting = false;
        self.pending = None;
    }
}
