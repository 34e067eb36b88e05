// src/models/attendance.rs
use super::{Id, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One student's outcome for one timetable entry on one date.
/// At most one record per (student, timetable entry, date) is kept by marking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Id,
    pub student_id: Id,
    pub subject_id: Id,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub timetable_entry_id: Id,
}

impl Record for AttendanceRecord {
    fn id(&self) -> Id {
        self.id
    }
}

/// Body of `POST /api/attendance/mark`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub student_id: Id,
    pub subject_id: Id,
    pub status: AttendanceStatus,
    pub timetable_entry_id: Id,
}

/// `total_classes` counts distinct dates with any record for the subject,
/// not the number of scheduled sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCounts {
    pub present_count: usize,
    pub total_classes: usize,
}

/// Dashboard totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_subjects: usize,
    pub total_present: u64,
    pub total_absent: u64,
    pub attendance_rate: u32, // rounded percentage
}

/// Present/absent totals of one time slot (dashboard line chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBreakdown {
    pub time_slot: String,
    pub present: usize,
    pub absent: usize,
}

/// Absences recorded on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAbsences {
    pub date: NaiveDate,
    pub absent: usize,
}

/// A projected absence count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub expected_absent: f64,
}

/// Outcome of a synthetic attendance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub days: u32,
    pub replaced: usize,
    pub present: usize,
    pub absent: usize,
}
