// src/services/recognition_service.rs
//! Face matching behind a trait, and the store operations that turn a match
//! into a present mark.

use crate::{
    config::MatcherKind,
    error::{AppError, AppResult},
    models::{attendance::{AttendanceRecord, AttendanceStatus}, student::Student, Id},
    services::store::AttendanceStore,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

pub trait FaceMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Picks the candidate the probe belongs to, if any.
    fn match_face(&self, probe: &str, candidates: &[&Student]) -> Option<Id>;
}

/// Stand-in for a real model: with probability `probability` returns a
/// uniformly random candidate among those with face data.
pub struct RandomFaceMatcher {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomFaceMatcher {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(probability: f64, seed: u64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FaceMatcher for RandomFaceMatcher {
    fn name(&self) -> &'static str {
        "random"
    }

    fn match_face(&self, _probe: &str, candidates: &[&Student]) -> Option<Id> {
        let enrolled: Vec<Id> = candidates
            .iter()
            .filter(|s| s.face_data.is_some())
            .map(|s| s.id)
            .collect();
        if enrolled.is_empty() {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.random::<f64>() >= self.probability {
            return None;
        }
        Some(enrolled[rng.random_range(0..enrolled.len())])
    }
}

/// Matches the candidate whose stored face data equals the probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactFaceMatcher;

impl FaceMatcher for ExactFaceMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn match_face(&self, probe: &str, candidates: &[&Student]) -> Option<Id> {
        candidates
            .iter()
            .find(|s| s.face_data.as_deref() == Some(probe))
            .map(|s| s.id)
    }
}

pub fn matcher_for(kind: MatcherKind, probability: f64) -> Arc<dyn FaceMatcher> {
    match kind {
        MatcherKind::Random => Arc::new(RandomFaceMatcher::new(probability)),
        MatcherKind::Exact => Arc::new(ExactFaceMatcher),
    }
}

/// Result of one recognition attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub matched: bool,
    pub student_id: Option<Id>,
    pub record: Option<AttendanceRecord>,
}

impl AttendanceStore {
    /// Runs the matcher over the students enrolled in the entry's subject,
    /// or over every student without an entry.
    pub fn identify(
        &self,
        matcher: &dyn FaceMatcher,
        probe: &str,
        timetable_entry_id: Option<Id>,
    ) -> AppResult<Option<Id>> {
        let candidates: Vec<&Student> = match timetable_entry_id {
            Some(entry_id) => {
                let entry = self
                    .timetable_entry(entry_id)
                    .ok_or_else(|| AppError::NotFound(format!("timetable entry {}", entry_id)))?;
                self.enrolled_students(entry.subject_id)
            }
            None => self.students.all().iter().collect(),
        };
        let found = matcher.match_face(probe, &candidates);
        tracing::debug!(
            "{} matcher over {} candidates: {:?}",
            matcher.name(),
            candidates.len(),
            found
        );
        Ok(found)
    }

    /// Marks the student present in the entry's subject today.
    pub async fn mark_present(
        &mut self,
        student_id: Id,
        timetable_entry_id: Id,
    ) -> AppResult<AttendanceRecord> {
        let subject_id = self
            .timetable_entry(timetable_entry_id)
            .map(|e| e.subject_id)
            .ok_or_else(|| AppError::NotFound(format!("timetable entry {}", timetable_entry_id)))?;
        self.mark_attendance(student_id, subject_id, AttendanceStatus::Present, timetable_entry_id)
            .await
    }

    /// Identifies the probe and, when an entry is given, marks the match present.
    pub async fn recognize(
        &mut self,
        matcher: &dyn FaceMatcher,
        probe: &str,
        timetable_entry_id: Option<Id>,
    ) -> AppResult<Recognition> {
        let student_id = self.identify(matcher, probe, timetable_entry_id)?;
        let record = match (student_id, timetable_entry_id) {
            (Some(student_id), Some(entry_id)) => {
                Some(self.mark_present(student_id, entry_id).await?)
            }
            _ => None,
        };
        Ok(Recognition {
            matched: student_id.is_some(),
            student_id,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_support::demo_store;

    #[tokio::test]
    async fn exact_matcher_marks_the_owner_present() {
        let mut store = demo_store().await;
        store.update_student_face_data(2, "face-of-mario".into()).await.unwrap();
        store.update_student_face_data(3, "face-of-kiara".into()).await.unwrap();
        let present_before = store.student(2).unwrap().total_present_day;

        // entry 1 is subject 1, enrolled {1, 2}
        let hit = store.recognize(&ExactFaceMatcher, "face-of-mario", Some(1)).await.unwrap();
        assert_eq!(hit.student_id, Some(2));
        let record = hit.record.unwrap();
        assert_eq!((record.subject_id, record.status), (1, AttendanceStatus::Present));
        assert_eq!(store.student(2).unwrap().total_present_day, present_before + 1);

        // Kiara is not enrolled in subject 1
        let miss = store.recognize(&ExactFaceMatcher, "face-of-kiara", Some(1)).await.unwrap();
        assert!(!miss.matched);
        assert_eq!(store.attendance().len(), 1);
    }

    #[tokio::test]
    async fn without_an_entry_nothing_is_marked() {
        let mut store = demo_store().await;
        store.update_student_face_data(3, "face-of-kiara".into()).await.unwrap();

        let hit = store.recognize(&ExactFaceMatcher, "face-of-kiara", None).await.unwrap();
        assert_eq!(hit.student_id, Some(3));
        assert!(hit.record.is_none());
        assert!(store.attendance().is_empty());
    }

    #[tokio::test]
    async fn unknown_entry_is_not_found() {
        let mut store = demo_store().await;
        let err = store.recognize(&ExactFaceMatcher, "x", Some(40)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn random_matcher_only_picks_students_with_face_data() {
        let mut store = demo_store().await;
        store.update_student_face_data(1, "blob".into()).await.unwrap();
        let students: Vec<&Student> = store.students().iter().collect();

        let always = RandomFaceMatcher::with_seed(1.0, 3);
        for _ in 0..20 {
            assert_eq!(always.match_face("anything", &students), Some(1));
        }
        let never = RandomFaceMatcher::with_seed(0.0, 3);
        assert_eq!(never.match_face("anything", &students), None);
    }

    #[tokio::test]
    async fn random_matcher_needs_face_data() {
        let store = demo_store().await;
        let students: Vec<&Student> = store.students().iter().collect();
        assert_eq!(RandomFaceMatcher::with_seed(1.0, 9).match_face("p", &students), None);
    }
}
