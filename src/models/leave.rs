// src/models/leave.rs
use super::{Id, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Open` is the only state with outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Open,
    Resolved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Open => "open",
            LeaveStatus::Resolved => "resolved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A teacher's declared unavailability for one timetable entry on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Id,
    pub teacher_id: Id,
    pub timetable_entry_id: Id,
    pub date: NaiveDate,
    pub replacement_teacher_id: Option<Id>,
    #[serde(default)]
    pub auto_assigned: bool,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for LeaveRequest {
    fn id(&self) -> Id {
        self.id
    }
}

/// The resolved outcome of a leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub id: Id,
    pub timetable_entry_id: Id,
    pub date: NaiveDate,
    pub replacement_teacher_id: Id,
    pub original_teacher_id: Id,
}

impl Record for Substitution {
    fn id(&self) -> Id {
        self.id
    }
}

/// Body of `POST /api/leaves/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeave {
    pub teacher_id: Id,
    pub timetable_entry_id: Id,
    pub date: NaiveDate,
    #[serde(default)]
    pub replacement_teacher_id: Option<Id>,
}
