// src/services/teacher_service.rs
use crate::{
    error::AppResult,
    models::{
        teacher::{NewTeacher, Teacher, TeacherPatch},
        Id,
    },
    services::store::{AttendanceStore, Slot},
};

impl AttendanceStore {
    pub fn teachers(&self) -> &[Teacher] {
        self.teachers.all()
    }

    pub fn teacher(&self, id: Id) -> Option<&Teacher> {
        self.teachers.get(id)
    }

    pub fn teacher_by_username(&self, username: &str) -> Option<&Teacher> {
        self.teachers.all().iter().find(|t| t.username == username)
    }

    /// Adds a teacher. Duplicate emails/usernames are accepted.
    pub async fn add_teacher(&mut self, new: NewTeacher) -> AppResult<Teacher> {
        let password_hash = self.hash(&new.password).await?;
        let teacher = Teacher {
            id: self.teachers.next_id(),
            name: new.name,
            email: new.email,
            username: new.username,
            password_hash,
            subject: new.subject,
            address: new.address,
        };
        tracing::info!("Adding teacher {} ({})", teacher.id, teacher.username);
        self.teachers.push(teacher.clone());
        self.persist(&[Slot::Teachers]).await?;
        Ok(teacher)
    }

    /// Merges `patch` into the teacher. Unknown ids are a silent no-op.
    pub async fn update_teacher(&mut self, id: Id, patch: TeacherPatch) -> AppResult<()> {
        let password_hash = match &patch.password {
            Some(raw) => Some(self.hash(raw).await?),
            None => None,
        };
        let Some(teacher) = self.teachers.get_mut(id) else {
            tracing::warn!("update_teacher: teacher {} not found, ignoring", id);
            return Ok(());
        };
        if let Some(name) = patch.name {
            teacher.name = name;
        }
        if let Some(email) = patch.email {
            teacher.email = email;
        }
        if let Some(username) = patch.username {
            teacher.username = username;
        }
        if let Some(hash) = password_hash {
            teacher.password_hash = hash;
        }
        if patch.subject.is_some() {
            teacher.subject = patch.subject;
        }
        if patch.address.is_some() {
            teacher.address = patch.address;
        }
        tracing::info!("Updated teacher {}", id);
        self.persist(&[Slot::Teachers]).await
    }

    /// Removes the teacher. Subjects, timetable entries and leaves keep their
    /// (now dangling) reference.
    pub async fn delete_teacher(&mut self, id: Id) -> AppResult<()> {
        if self.teachers.remove(id).is_none() {
            tracing::warn!("delete_teacher: teacher {} not found, ignoring", id);
        } else {
            tracing::info!("Deleted teacher {}", id);
        }
        self.persist(&[Slot::Teachers]).await
    }
}
