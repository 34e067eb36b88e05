// src/models/subject.rs
use super::{Id, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A subject. The teacher is referenced by id only, the name is joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Id,
    pub name: String,
    pub code: String,
    pub course: String,
    #[serde(default)]
    pub teacher_id: Option<Id>,
    #[serde(default)]
    pub enrolled_students: BTreeSet<Id>,
}

impl Record for Subject {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub course: String,
    #[serde(default)]
    pub teacher_id: Option<Id>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub course: Option<String>,
    pub teacher_id: Option<Id>,
}

/// Subject plus the resolved teacher name (`None` when the teacher is gone).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    #[serde(flatten)]
    pub subject: Subject,
    pub teacher_name: Option<String>,
}
