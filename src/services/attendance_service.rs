// src/services/attendance_service.rs
use crate::{
    error::AppResult,
    models::{
        attendance::{AttendanceCounts, AttendanceRecord, AttendanceStatus, DashboardStats},
        student::Student,
        Id,
    },
    services::store::{today, AttendanceStore, Slot},
};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Adds one day to the counter of `status`.
pub(crate) fn credit(student: &mut Student, status: AttendanceStatus) {
    match status {
        AttendanceStatus::Present => student.total_present_day += 1,
        AttendanceStatus::Absent => student.total_absence_day += 1,
    }
}

/// Takes one day off the counter of `status`, never below zero.
pub(crate) fn debit(student: &mut Student, status: AttendanceStatus) {
    match status {
        AttendanceStatus::Present => {
            student.total_present_day = student.total_present_day.saturating_sub(1)
        }
        AttendanceStatus::Absent => {
            student.total_absence_day = student.total_absence_day.saturating_sub(1)
        }
    }
}

impl AttendanceStore {
    pub fn attendance(&self) -> &[AttendanceRecord] {
        self.attendance.all()
    }

    /// Records `status` for the student in the timetable slot today.
    pub async fn mark_attendance(
        &mut self,
        student_id: Id,
        subject_id: Id,
        status: AttendanceStatus,
        timetable_entry_id: Id,
    ) -> AppResult<AttendanceRecord> {
        self.mark_attendance_on(today(), student_id, subject_id, status, timetable_entry_id)
            .await
    }

    /// Last write wins per (student, timetable entry, date).
    ///
    /// Counters move only when something changed: a new record credits its
    /// status, a status change moves one day from the old counter to the new
    /// one, repeating the same status is a no-op for the totals.
    pub async fn mark_attendance_on(
        &mut self,
        date: NaiveDate,
        student_id: Id,
        subject_id: Id,
        status: AttendanceStatus,
        timetable_entry_id: Id,
    ) -> AppResult<AttendanceRecord> {
        // 1. Overwrite the existing record or create one
        let existing = self.attendance.iter_mut().find(|r| {
            r.student_id == student_id
                && r.timetable_entry_id == timetable_entry_id
                && r.date == date
        });
        let (record, previous) = match existing {
            Some(record) => {
                let previous = record.status;
                record.status = status;
                (record.clone(), Some(previous))
            }
            None => {
                let record = AttendanceRecord {
                    id: self.attendance.next_id(),
                    student_id,
                    subject_id,
                    date,
                    status,
                    timetable_entry_id,
                };
                self.attendance.push(record.clone());
                (record, None)
            }
        };

        // 2. Running totals of the student
        match self.students.get_mut(student_id) {
            Some(student) => match previous {
                Some(prev) if prev == status => {}
                Some(prev) => {
                    debit(student, prev);
                    credit(student, status);
                }
                None => credit(student, status),
            },
            None => tracing::warn!(
                "mark_attendance: student {} not found, totals untouched",
                student_id
            ),
        }

        tracing::info!(
            "Attendance {:?} for student {} in entry {} on {} (record {})",
            status,
            student_id,
            timetable_entry_id,
            date,
            record.id
        );
        self.persist(&[Slot::Attendance, Slot::Students]).await?;
        Ok(record)
    }

    /// Today's records for a timetable slot.
    pub fn attendance_for_class(&self, timetable_entry_id: Id) -> Vec<&AttendanceRecord> {
        self.attendance_for_class_on(timetable_entry_id, today())
    }

    pub fn attendance_for_class_on(
        &self,
        timetable_entry_id: Id,
        date: NaiveDate,
    ) -> Vec<&AttendanceRecord> {
        self.attendance
            .all()
            .iter()
            .filter(|r| r.timetable_entry_id == timetable_entry_id && r.date == date)
            .collect()
    }

    /// Present records of the student in the subject, against the number of
    /// distinct dates on which the subject has any record at all.
    pub fn attendance_counts(&self, student_id: Id, subject_id: Id) -> AttendanceCounts {
        let mut class_days = HashSet::new();
        let mut present_count = 0;
        for record in self.attendance.all().iter().filter(|r| r.subject_id == subject_id) {
            class_days.insert(record.date);
            if record.student_id == student_id && record.status == AttendanceStatus::Present {
                present_count += 1;
            }
        }
        AttendanceCounts {
            present_count,
            total_classes: class_days.len(),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        let students = self.students.all();
        let total_present: u64 = students.iter().map(|s| u64::from(s.total_present_day)).sum();
        let total_absent: u64 = students.iter().map(|s| u64::from(s.total_absence_day)).sum();
        let total = total_present + total_absent;
        let attendance_rate = if total > 0 {
            (total_present as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };
        DashboardStats {
            total_students: students.len(),
            total_teachers: self.teachers.len(),
            total_subjects: self.subjects.len(),
            total_present,
            total_absent,
            attendance_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_support::demo_store;

    fn totals(store: &AttendanceStore, id: Id) -> (u32, u32) {
        let s = store.student(id).unwrap();
        (s.total_present_day, s.total_absence_day)
    }

    #[tokio::test]
    async fn same_status_twice_is_idempotent() {
        let mut store = demo_store().await;
        let before = totals(&store, 1);

        let first = store.mark_attendance(1, 2, AttendanceStatus::Present, 3).await.unwrap();
        let after_first = totals(&store, 1);
        let second = store.mark_attendance(1, 2, AttendanceStatus::Present, 3).await.unwrap();

        assert_eq!(after_first, (before.0 + 1, before.1));
        assert_eq!(totals(&store, 1), after_first);
        assert_eq!(first.id, second.id);
        assert_eq!(store.attendance().len(), 1);
    }

    #[tokio::test]
    async fn changing_status_moves_one_day() {
        let mut store = demo_store().await;
        let (present, absent) = totals(&store, 1);

        store.mark_attendance(1, 2, AttendanceStatus::Present, 3).await.unwrap();
        store.mark_attendance(1, 2, AttendanceStatus::Absent, 3).await.unwrap();

        // relative to before the first call: present back where it was, absent +1
        assert_eq!(totals(&store, 1), (present, absent + 1));
        assert_eq!(store.attendance()[0].status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn decrement_is_floored_at_zero() {
        let mut store = demo_store().await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        store.mark_attendance_on(date, 2, 1, AttendanceStatus::Present, 1).await.unwrap();
        store
            .update_student(2, crate::models::student::StudentPatch {
                total_present_day: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();

        store.mark_attendance_on(date, 2, 1, AttendanceStatus::Absent, 1).await.unwrap();
        assert_eq!(totals(&store, 2).0, 0);
    }

    #[tokio::test]
    async fn unknown_student_still_gets_a_record() {
        let mut store = demo_store().await;
        store.mark_attendance(42, 1, AttendanceStatus::Absent, 1).await.unwrap();
        assert_eq!(store.attendance().len(), 1);
    }

    #[tokio::test]
    async fn class_view_is_limited_to_the_day() {
        let mut store = demo_store().await;
        let yesterday = today().pred_opt().unwrap();
        store.mark_attendance_on(yesterday, 1, 1, AttendanceStatus::Present, 1).await.unwrap();
        store.mark_attendance(2, 1, AttendanceStatus::Present, 1).await.unwrap();
        store.mark_attendance(3, 1, AttendanceStatus::Absent, 2).await.unwrap();

        let ids: Vec<_> = store.attendance_for_class(1).iter().map(|r| r.student_id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(store.attendance_for_class_on(1, yesterday).len(), 1);
    }

    #[tokio::test]
    async fn counts_use_distinct_days_of_the_subject() {
        let mut store = demo_store().await;
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        store.mark_attendance_on(d1, 1, 1, AttendanceStatus::Present, 1).await.unwrap();
        store.mark_attendance_on(d2, 1, 1, AttendanceStatus::Absent, 1).await.unwrap();
        // another student's record still makes d3 a class day
        store.mark_attendance_on(d3, 2, 1, AttendanceStatus::Present, 5).await.unwrap();
        // other subject does not count
        store.mark_attendance_on(d3, 1, 2, AttendanceStatus::Present, 2).await.unwrap();

        let counts = store.attendance_counts(1, 1);
        assert_eq!(counts, AttendanceCounts { present_count: 1, total_classes: 3 });
        assert_eq!(store.attendance_counts(1, 3), AttendanceCounts::default());
    }

    #[tokio::test]
    async fn stats_sum_the_running_counters() {
        let store = demo_store().await;
        let stats = store.stats();
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_teachers, 3);
        assert_eq!(stats.total_subjects, 4);
        assert_eq!(stats.total_present, 33);
        assert_eq!(stats.total_absent, 15);
        assert_eq!(stats.attendance_rate, 69); // 33 / 48 = 68.75
    }
}
