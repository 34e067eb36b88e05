// src/models/student.rs
use super::{Id, Record};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEMESTER: &str = "First";

fn default_semester() -> String {
    DEFAULT_SEMESTER.to_string()
}

/// A student as persisted in the store.
/// `total_present_day` / `total_absence_day` are running counters kept by attendance marking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub course: String,
    #[serde(default = "default_semester")]
    pub semester: String,
    #[serde(default)]
    pub total_present_day: u32,
    #[serde(default)]
    pub total_absence_day: u32,
    #[serde(default)]
    pub face_data: Option<String>, // opaque blob reference (e.g. a data URL)
}

impl Record for Student {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub course: String,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub total_present_day: Option<u32>,
    #[serde(default)]
    pub total_absence_day: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub course: Option<String>,
    pub semester: Option<String>,
    pub total_present_day: Option<u32>,
    pub total_absence_day: Option<u32>,
    pub face_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub username: String,
    pub course: String,
    pub semester: String,
    pub total_present_day: u32,
    pub total_absence_day: u32,
    pub has_face_data: bool,
}

impl From<&Student> for StudentSummary {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            email: s.email.clone(),
            username: s.username.clone(),
            course: s.course.clone(),
            semester: s.semester.clone(),
            total_present_day: s.total_present_day,
            total_absence_day: s.total_absence_day,
            has_face_data: s.face_data.is_some(),
        }
    }
}
