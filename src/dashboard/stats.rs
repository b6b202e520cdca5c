//! Per-status attendance counts.

use serde::Serialize;

use crate::models::{Attendance, AttendanceStatus};

/// Counts for the currently displayed attendance rows.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct AttendanceStats {
    pub present: usize,
    pub late: usize,
    pub excused: usize,
    pub absent: usize,
    pub total: usize,
}

/// Fold over the collection. Recomputed from scratch on every render.
pub fn compute_stats(records: &[Attendance]) -> AttendanceStats {
    records
        .iter()
        .fold(AttendanceStats::default(), |mut stats, record| {
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Excused => stats.excused += 1,
                AttendanceStatus::Absent => stats.absent += 1,
            }
            stats.total += 1;
            stats
        })
}
