// src/services/seed_service.rs
//! Synthetic data for the dashboard: attendance history and a few extra students.

use crate::{
    error::AppResult,
    models::{
        attendance::{AttendanceRecord, AttendanceStatus, SeedSummary},
        student::{NewStudent, Student},
        timetable::TimetableEntry,
        Id,
    },
    services::{
        attendance_service::{credit, debit},
        store::{today, AttendanceStore, Slot},
    },
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::Rng;

/// Presence probability when nothing lowers it.
pub const BASE_PRESENCE: f64 = 0.8;
const MIN_PRESENCE: f64 = 0.05;

const DEMO_STUDENTS: [(&str, &str); 4] = [
    ("Saksham Jain", "sakshamjain"),
    ("Rohain", "rohain"),
    ("Anirduh", "anirduh"),
    ("Varun", "varun"),
];

/// Presence probability with the dashboard patterns applied.
pub fn patterned_probability(date: NaiveDate, entry: &TimetableEntry, student_id: Id) -> f64 {
    let mut p = BASE_PRESENCE;
    match date.weekday() {
        Weekday::Mon => p -= 0.15,
        Weekday::Fri => p -= 0.10,
        _ => {}
    }
    if entry.subject_id % 3 == 0 {
        p -= 0.10;
    }
    if entry.time_slot.trim_start().starts_with("09:00") {
        p -= 0.10;
    }
    if student_id % 4 == 0 {
        p -= 0.25;
    }
    p.max(MIN_PRESENCE)
}

impl AttendanceStore {
    /// Random attendance at a flat 80 % for the last `days` days, today excluded.
    pub async fn seed_attendance<R: Rng>(
        &mut self,
        days: u32,
        rng: &mut R,
    ) -> AppResult<SeedSummary> {
        let summary = self.generate(days, rng, |_, _, _| BASE_PRESENCE);
        self.persist(&[Slot::Attendance, Slot::Students]).await?;
        Ok(summary)
    }

    /// Like `seed_attendance`, with weekday, subject, slot and student patterns.
    pub async fn seed_patterned_attendance<R: Rng>(
        &mut self,
        days: u32,
        rng: &mut R,
    ) -> AppResult<SeedSummary> {
        let summary = self.generate(days, rng, patterned_probability);
        self.persist(&[Slot::Attendance, Slot::Students]).await?;
        Ok(summary)
    }

    /// Walks the window day by day, one record per enrolled student of every
    /// entry scheduled that weekday. Records already in the window are replaced
    /// and their counters taken back first.
    fn generate<R, P>(&mut self, days: u32, rng: &mut R, probability: P) -> SeedSummary
    where
        R: Rng,
        P: Fn(NaiveDate, &TimetableEntry, Id) -> f64,
    {
        let end = today();
        let Some(start) = end.checked_sub_days(Days::new(u64::from(days))) else {
            tracing::warn!("seed: window of {} days is out of range", days);
            return SeedSummary::default();
        };
        let mut summary = SeedSummary {
            days,
            ..Default::default()
        };

        // 1. Take back whatever is already in the window
        let mut dropped = Vec::new();
        summary.replaced = self.attendance.retain(|r| {
            let inside = r.date >= start && r.date < end;
            if inside {
                dropped.push((r.student_id, r.status));
            }
            !inside
        });
        for (student_id, status) in dropped {
            if let Some(student) = self.students.get_mut(student_id) {
                debit(student, status);
            }
        }

        // 2. Fresh records
        for date in start.iter_days().take_while(|d| *d < end) {
            let entries: Vec<TimetableEntry> = self
                .timetable
                .all()
                .iter()
                .filter(|e| e.is_on(date.weekday()))
                .cloned()
                .collect();
            for entry in entries {
                let Some(subject) = self.subjects.get(entry.subject_id) else {
                    continue;
                };
                let enrolled: Vec<Id> = subject.enrolled_students.iter().copied().collect();
                for student_id in enrolled {
                    let status = if rng.random::<f64>() < probability(date, &entry, student_id) {
                        summary.present += 1;
                        AttendanceStatus::Present
                    } else {
                        summary.absent += 1;
                        AttendanceStatus::Absent
                    };
                    let record = AttendanceRecord {
                        id: self.attendance.next_id(),
                        student_id,
                        subject_id: entry.subject_id,
                        date,
                        status,
                        timetable_entry_id: entry.id,
                    };
                    self.attendance.push(record);
                    if let Some(student) = self.students.get_mut(student_id) {
                        credit(student, status);
                    }
                }
            }
        }

        tracing::info!(
            "🌱 Seeded {} days of attendance: {} present, {} absent, {} replaced",
            days,
            summary.present,
            summary.absent,
            summary.replaced
        );
        summary
    }

    /// Makes sure the four demo students exist, looked up by username.
    /// Returns only the ones created by this call.
    pub async fn seed_demo_students(&mut self) -> AppResult<Vec<Student>> {
        let mut created = Vec::new();
        for (name, username) in DEMO_STUDENTS {
            if self.student_by_username(username).is_some() {
                continue;
            }
            let student = self
                .add_student(NewStudent {
                    name: name.into(),
                    email: format!("{}@example.com", username),
                    username: username.into(),
                    password: username.into(),
                    course: "BIT".into(),
                    semester: None,
                    total_present_day: None,
                    total_absence_day: None,
                })
                .await?;
            created.push(student);
        }
        tracing::info!("Demo students: {} created", created.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_support::demo_store;
    use rand::{rngs::StdRng, SeedableRng};

    fn entry(subject_id: Id, slot: &str) -> TimetableEntry {
        TimetableEntry {
            id: 1,
            day: "Monday".into(),
            time_slot: slot.into(),
            subject_id,
            teacher_id: 1,
            room: "Room 101".into(),
            course: "Computer Science".into(),
        }
    }

    fn marked_days(store: &AttendanceStore) -> u32 {
        store
            .students()
            .iter()
            .map(|s| s.total_present_day + s.total_absence_day)
            .sum()
    }

    #[test]
    fn patterns_lower_the_probability() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let late = entry(1, "10:00 - 11:00");

        assert!((patterned_probability(wednesday, &late, 1) - 0.8).abs() < 1e-9);
        assert!((patterned_probability(monday, &late, 1) - 0.65).abs() < 1e-9);
        let p = patterned_probability(wednesday, &entry(3, "10:00 - 11:00"), 1);
        assert!((p - 0.7).abs() < 1e-9);
        let p = patterned_probability(wednesday, &entry(1, "09:00 - 10:00"), 8);
        assert!((p - 0.45).abs() < 1e-9);
        // all four patterns stack
        assert!((patterned_probability(monday, &entry(3, "09:00 - 10:00"), 4) - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn seeding_keeps_counters_in_step_with_records() {
        let mut store = demo_store().await;
        let before = marked_days(&store);
        let mut rng = StdRng::seed_from_u64(7);

        let summary = store.seed_attendance(14, &mut rng).await.unwrap();

        // two full weeks: every demo entry runs twice
        // entries 1..=5 enroll 2, 2, 2, 1, 2 students
        assert_eq!(summary.present + summary.absent, 2 * (2 + 2 + 2 + 1 + 2));
        assert_eq!(store.attendance().len(), summary.present + summary.absent);
        let after = marked_days(&store);
        assert_eq!(after as usize, before as usize + store.attendance().len());
        assert!(store.attendance().iter().all(|r| r.date < today()));
    }

    #[tokio::test]
    async fn reseeding_replaces_the_window() {
        let mut store = demo_store().await;
        let before = marked_days(&store);
        let mut rng = StdRng::seed_from_u64(42);

        let first = store.seed_patterned_attendance(7, &mut rng).await.unwrap();
        let second = store.seed_patterned_attendance(7, &mut rng).await.unwrap();

        assert_eq!(second.replaced, first.present + first.absent);
        assert_eq!(store.attendance().len(), second.present + second.absent);
        let after = marked_days(&store);
        assert_eq!(after as usize, before as usize + store.attendance().len());
    }

    #[tokio::test]
    async fn demo_students_are_created_once() {
        let mut store = demo_store().await;
        let created = store.seed_demo_students().await.unwrap();
        let names: Vec<_> = created.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, ["sakshamjain", "rohain", "anirduh", "varun"]);
        assert_eq!(created[0].semester, "First");

        assert!(store.seed_demo_students().await.unwrap().is_empty());
        assert_eq!(store.students().len(), 7);
    }
}
