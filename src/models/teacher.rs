// src/models/teacher.rs
use super::{Id, Record};
use serde::{Deserialize, Serialize};

/// A teacher as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub subject: Option<String>, // free-form label, e.g. "Mathematics"
    #[serde(default)]
    pub address: Option<String>,
}

impl Record for Teacher {
    fn id(&self) -> Id {
        self.id
    }
}

/// Payload for creating a teacher. The password arrives in clear and is hashed by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update, every `Some` field overwrites the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub subject: Option<String>,
    pub address: Option<String>,
}

/// What the API exposes about a teacher (never the hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub username: String,
    pub subject: Option<String>,
    pub address: Option<String>,
}

impl From<&Teacher> for TeacherSummary {
    fn from(t: &Teacher) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            email: t.email.clone(),
            username: t.username.clone(),
            subject: t.subject.clone(),
            address: t.address.clone(),
        }
    }
}
