//! Attendance (absensi) model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RoleCategory;

/// Attendance status for one member on one day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    #[serde(alias = "hadir")]
    Present,
    #[serde(alias = "telat")]
    Late,
    #[serde(alias = "ijin")]
    Excused,
    #[serde(alias = "tidak_hadir")]
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" | "hadir" => Some(AttendanceStatus::Present),
            "late" | "telat" => Some(AttendanceStatus::Late),
            "excused" | "ijin" => Some(AttendanceStatus::Excused),
            "absent" | "tidak_hadir" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Hadir",
            AttendanceStatus::Late => "Telat",
            AttendanceStatus::Excused => "Ijin",
            AttendanceStatus::Absent => "Tidak Hadir",
        }
    }

    /// Excused and absent entries must say why.
    pub fn requires_reason(&self) -> bool {
        matches!(self, AttendanceStatus::Excused | AttendanceStatus::Absent)
    }
}

/// Read-only snapshot of the member an attendance row belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSnapshot {
    pub id: String,
    pub name: String,
    pub role_category: RoleCategory,
}

/// An attendance row joined with its member's display fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendance {
    pub id: String,
    pub member_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// `None` only if the member row vanished between write and read.
    pub member: Option<MemberSnapshot>,
}

/// Validated fields for a new attendance row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub member_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

/// Validated changes for an existing attendance row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceChanges {
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

/// Raw attendance form input, for both new rows and edits.
///
/// On edit, `member_id` and `date` may be posted back unchanged but must
/// match the stored row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceForm {
    #[serde(default)]
    pub member_id: String,
    /// Falls back to the date currently selected in the register.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<&Attendance> for AttendanceForm {
    fn from(record: &Attendance) -> Self {
        Self {
            member_id: record.member_id.clone(),
            date: Some(record.date.to_string()),
            status: record.status,
            reason: record.reason.clone(),
        }
    }
}
