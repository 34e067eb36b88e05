// src/models/timetable.rs
use super::{Id, Record};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One scheduled (day, time slot, subject, teacher, room) unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: Id,
    pub day: String,       // "Monday", also accepts "Mon" / "monday"
    pub time_slot: String, // "09:00 - 10:00"
    pub subject_id: Id,
    pub teacher_id: Id,
    pub room: String,
    pub course: String,
}

impl TimetableEntry {
    /// Parses the free-form day label. Long, short and any casing are accepted.
    pub fn weekday(&self) -> Option<Weekday> {
        self.day.trim().parse::<Weekday>().ok()
    }

    pub fn is_on(&self, weekday: Weekday) -> bool {
        self.weekday() == Some(weekday)
    }

    /// Same day and same time slot as `other`.
    pub fn overlaps(&self, other: &TimetableEntry) -> bool {
        self.weekday().is_some()
            && self.weekday() == other.weekday()
            && self.time_slot.trim() == other.time_slot.trim()
    }
}

impl Record for TimetableEntry {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimetableEntry {
    pub day: String,
    pub time_slot: String,
    pub subject_id: Id,
    pub teacher_id: Id,
    pub room: String,
    pub course: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntryPatch {
    pub day: Option<String>,
    pub time_slot: Option<String>,
    pub subject_id: Option<Id>,
    pub teacher_id: Option<Id>,
    pub room: Option<String>,
    pub course: Option<String>,
}
