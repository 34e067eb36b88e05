// src/services/student_service.rs
use crate::{
    error::AppResult,
    models::{
        student::{NewStudent, Student, StudentPatch, DEFAULT_SEMESTER},
        Id,
    },
    services::store::{AttendanceStore, Slot},
};

impl AttendanceStore {
    pub fn students(&self) -> &[Student] {
        self.students.all()
    }

    pub fn student(&self, id: Id) -> Option<&Student> {
        self.students.get(id)
    }

    pub fn student_by_username(&self, username: &str) -> Option<&Student> {
        self.students.all().iter().find(|s| s.username == username)
    }

    /// Adds a student. Semester defaults to "First", counters to 0.
    pub async fn add_student(&mut self, new: NewStudent) -> AppResult<Student> {
        let password_hash = self.hash(&new.password).await?;
        let student = Student {
            id: self.students.next_id(),
            name: new.name,
            email: new.email,
            username: new.username,
            password_hash,
            course: new.course,
            semester: new
                .semester
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SEMESTER.to_string()),
            total_present_day: new.total_present_day.unwrap_or(0),
            total_absence_day: new.total_absence_day.unwrap_or(0),
            face_data: None,
        };
        tracing::info!("Adding student {} ({})", student.id, student.username);
        self.students.push(student.clone());
        self.persist(&[Slot::Students]).await?;
        Ok(student)
    }

    pub async fn update_student(&mut self, id: Id, patch: StudentPatch) -> AppResult<()> {
        let password_hash = match &patch.password {
            Some(raw) => Some(self.hash(raw).await?),
            None => None,
        };
        let Some(student) = self.students.get_mut(id) else {
            tracing::warn!("update_student: student {} not found, ignoring", id);
            return Ok(());
        };
        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(email) = patch.email {
            student.email = email;
        }
        if let Some(username) = patch.username {
            student.username = username;
        }
        if let Some(hash) = password_hash {
            student.password_hash = hash;
        }
        if let Some(course) = patch.course {
            student.course = course;
        }
        if let Some(semester) = patch.semester {
            student.semester = semester;
        }
        if let Some(present) = patch.total_present_day {
            student.total_present_day = present;
        }
        if let Some(absent) = patch.total_absence_day {
            student.total_absence_day = absent;
        }
        if patch.face_data.is_some() {
            student.face_data = patch.face_data;
        }
        tracing::info!("Updated student {}", id);
        self.persist(&[Slot::Students]).await
    }

    /// Removes the student and every enrollment of it. Attendance records stay.
    pub async fn delete_student(&mut self, id: Id) -> AppResult<()> {
        if self.students.remove(id).is_none() {
            tracing::warn!("delete_student: student {} not found, ignoring", id);
            return self.persist(&[Slot::Students]).await;
        }
        let mut unenrolled = 0;
        for subject in self.subjects.iter_mut() {
            if subject.enrolled_students.remove(&id) {
                unenrolled += 1;
            }
        }
        tracing::info!("Deleted student {} (removed from {} subjects)", id, unenrolled);
        self.persist(&[Slot::Students, Slot::Subjects]).await
    }

    /// Stores the face blob used by recognition.
    pub async fn update_student_face_data(&mut self, id: Id, face_data: String) -> AppResult<()> {
        let Some(student) = self.students.get_mut(id) else {
            tracing::warn!("update_student_face_data: student {} not found, ignoring", id);
            return Ok(());
        };
        student.face_data = Some(face_data);
        tracing::info!("Face data registered for student {}", id);
        self.persist(&[Slot::Students]).await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::attendance::AttendanceStatus;
    use crate::models::student::NewStudent;
    use crate::services::store::test_support::demo_store;

    fn new_student(username: &str) -> NewStudent {
        NewStudent {
            name: "Anuj Kumar".into(),
            email: "anuj@example.com".into(),
            username: username.into(),
            password: "anuj".into(),
            course: "BIT".into(),
            semester: None,
            total_present_day: None,
            total_absence_day: None,
        }
    }

    #[tokio::test]
    async fn new_students_get_defaults() {
        let mut store = demo_store().await;
        let s = store.add_student(new_student("anuj")).await.unwrap();
        assert_eq!(s.id, 4);
        assert_eq!(s.semester, "First");
        assert_eq!((s.total_present_day, s.total_absence_day), (0, 0));
        assert!(s.face_data.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_enrollment_but_not_attendance() {
        let mut store = demo_store().await;
        store.mark_attendance(1, 1, AttendanceStatus::Present, 1).await.unwrap();

        store.delete_student(1).await.unwrap();

        assert!(store.student(1).is_none());
        assert!(store.subjects().iter().all(|s| !s.enrolled_students.contains(&1)));
        assert_eq!(store.attendance().iter().filter(|r| r.student_id == 1).count(), 1);
    }

    #[tokio::test]
    async fn face_data_is_stored() {
        let mut store = demo_store().await;
        store.update_student_face_data(2, "data:image/jpeg;base64,AAAA".into()).await.unwrap();
        assert_eq!(
            store.student(2).unwrap().face_data.as_deref(),
            Some("data:image/jpeg;base64,AAAA")
        );
    }
}
