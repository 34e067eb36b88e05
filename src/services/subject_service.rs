// src/services/subject_service.rs
use crate::{
    error::AppResult,
    models::{
        student::Student,
        subject::{NewSubject, Subject, SubjectPatch, SubjectView},
        Id,
    },
    services::store::{AttendanceStore, Slot},
};

impl AttendanceStore {
    pub fn subjects(&self) -> &[Subject] {
        self.subjects.all()
    }

    pub fn subject(&self, id: Id) -> Option<&Subject> {
        self.subjects.get(id)
    }

    /// Subjects joined with their teacher's name.
    pub fn subject_views(&self) -> Vec<SubjectView> {
        self.subjects
            .all()
            .iter()
            .map(|subject| SubjectView {
                teacher_name: subject
                    .teacher_id
                    .and_then(|tid| self.teachers.get(tid))
                    .map(|t| t.name.clone()),
                subject: subject.clone(),
            })
            .collect()
    }

    /// Adds a subject with an empty enrollment.
    pub async fn add_subject(&mut self, new: NewSubject) -> AppResult<Subject> {
        let subject = Subject {
            id: self.subjects.next_id(),
            name: new.name,
            code: new.code,
            course: new.course,
            teacher_id: new.teacher_id,
            enrolled_students: Default::default(),
        };
        tracing::info!("Adding subject {} ({})", subject.id, subject.code);
        self.subjects.push(subject.clone());
        self.persist(&[Slot::Subjects]).await?;
        Ok(subject)
    }

    pub async fn update_subject(&mut self, id: Id, patch: SubjectPatch) -> AppResult<()> {
        let Some(subject) = self.subjects.get_mut(id) else {
            tracing::warn!("update_subject: subject {} not found, ignoring", id);
            return Ok(());
        };
        if let Some(name) = patch.name {
            subject.name = name;
        }
        if let Some(code) = patch.code {
            subject.code = code;
        }
        if let Some(course) = patch.course {
            subject.course = course;
        }
        if patch.teacher_id.is_some() {
            subject.teacher_id = patch.teacher_id;
        }
        tracing::info!("Updated subject {}", id);
        self.persist(&[Slot::Subjects]).await
    }

    /// Removes the subject only. Timetable entries and attendance records
    /// pointing at it are left in place.
    pub async fn delete_subject(&mut self, id: Id) -> AppResult<()> {
        if self.subjects.remove(id).is_none() {
            tracing::warn!("delete_subject: subject {} not found, ignoring", id);
        } else {
            let dangling = self.timetable.all().iter().filter(|e| e.subject_id == id).count();
            tracing::info!(
                "Deleted subject {} ({} timetable entries still reference it)",
                id,
                dangling
            );
        }
        self.persist(&[Slot::Subjects]).await
    }

    pub async fn enroll_student(&mut self, student_id: Id, subject_id: Id) -> AppResult<()> {
        let Some(subject) = self.subjects.get_mut(subject_id) else {
            tracing::warn!("enroll_student: subject {} not found, ignoring", subject_id);
            return Ok(());
        };
        if subject.enrolled_students.insert(student_id) {
            tracing::info!("Student {} enrolled in subject {}", student_id, subject_id);
        }
        self.persist(&[Slot::Subjects]).await
    }

    pub async fn unenroll_student(&mut self, student_id: Id, subject_id: Id) -> AppResult<()> {
        let Some(subject) = self.subjects.get_mut(subject_id) else {
            tracing::warn!("unenroll_student: subject {} not found, ignoring", subject_id);
            return Ok(());
        };
        if subject.enrolled_students.remove(&student_id) {
            tracing::info!("Student {} removed from subject {}", student_id, subject_id);
        }
        self.persist(&[Slot::Subjects]).await
    }

    /// Students enrolled in the subject that still exist.
    pub fn enrolled_students(&self, subject_id: Id) -> Vec<&Student> {
        let Some(subject) = self.subjects.get(subject_id) else {
            return Vec::new();
        };
        self.students
            .all()
            .iter()
            .filter(|s| subject.enrolled_students.contains(&s.id))
            .collect()
    }

    pub fn student_subjects(&self, student_id: Id) -> Vec<&Subject> {
        self.subjects
            .all()
            .iter()
            .filter(|s| s.enrolled_students.contains(&student_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::subject::{NewSubject, SubjectPatch};
    use crate::services::store::test_support::demo_store;

    #[tokio::test]
    async fn teacher_name_is_joined_at_read_time() {
        let mut store = demo_store().await;
        let patch = SubjectPatch {
            teacher_id: Some(2),
            ..Default::default()
        };
        store.update_subject(3, patch).await.unwrap();

        let views = store.subject_views();
        let dbms = views.iter().find(|v| v.subject.id == 3).unwrap();
        assert_eq!(dbms.teacher_name.as_deref(), Some("Sarah Johnson"));

        store.delete_teacher(2).await.unwrap();
        let views = store.subject_views();
        assert_eq!(views.iter().find(|v| v.subject.id == 3).unwrap().teacher_name, None);
    }

    #[tokio::test]
    async fn enrollment_is_a_set() {
        let mut store = demo_store().await;
        let subject = store
            .add_subject(NewSubject {
                name: "Operating Systems".into(),
                code: "CS310".into(),
                course: "Computer Science".into(),
                teacher_id: Some(3),
            })
            .await
            .unwrap();
        assert!(subject.enrolled_students.is_empty());

        store.enroll_student(2, subject.id).await.unwrap();
        store.enroll_student(2, subject.id).await.unwrap();
        store.enroll_student(3, subject.id).await.unwrap();
        assert_eq!(store.enrolled_students(subject.id).len(), 2);

        store.unenroll_student(2, subject.id).await.unwrap();
        let ids: Vec<_> = store.enrolled_students(subject.id).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn student_subjects_follow_enrollment() {
        let store = demo_store().await;
        let mut ids: Vec<_> = store.student_subjects(1).iter().map(|s| s.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn deleting_a_subject_does_not_touch_the_timetable() {
        let mut store = demo_store().await;
        store.delete_subject(1).await.unwrap();
        assert!(store.subject(1).is_none());
        assert_eq!(store.timetable().iter().filter(|e| e.subject_id == 1).count(), 2);
    }
}
