// src/models/user.rs
use super::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

// Body of POST /api/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub role: Role,
    pub username: String,
    pub password: String,
}

/// What the session remembers about the logged-in user.
/// `id` is the teacher/student id, `None` for the configured admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<Id>,
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Teacher)
    }
}
