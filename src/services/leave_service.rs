// src/services/leave_service.rs
//! Leave requests and the substitutions they resolve to.
//!
//! A request starts `Open` and ends either `Resolved` (a substitution is
//! recorded) or `Rejected`. Teacher and timetable ids are not validated.

use crate::{
    error::{AppError, AppResult},
    models::{
        leave::{LeaveRequest, LeaveStatus, NewLeave, Substitution},
        Id,
    },
    services::{
        replacement::ReplacementContext,
        store::{today, AttendanceStore, Slot},
    },
};
use chrono::{NaiveDate, Utc};

impl AttendanceStore {
    /// Asks the configured policy for a substitute.
    fn pick_replacement(
        &self,
        requester_id: Id,
        timetable_entry_id: Id,
        date: NaiveDate,
    ) -> Option<Id> {
        let ctx = ReplacementContext {
            teachers: self.teachers.all(),
            timetable: self.timetable.all(),
            substitutions: self.substitutions.all(),
            requester_id,
            timetable_entry_id,
            date,
        };
        self.policy.choose(&ctx)
    }

    /// Opens a leave request. Without an explicit replacement the policy picks
    /// one and the request is flagged `auto_assigned`.
    pub async fn apply_leave(&mut self, new: NewLeave) -> AppResult<LeaveRequest> {
        let (replacement_teacher_id, auto_assigned) = match new.replacement_teacher_id {
            Some(id) => (Some(id), false),
            None => {
                let picked =
                    self.pick_replacement(new.teacher_id, new.timetable_entry_id, new.date);
                if picked.is_none() {
                    tracing::warn!(
                        "apply_leave: no replacement available for teacher {} on {}",
                        new.teacher_id,
                        new.date
                    );
                }
                (picked, picked.is_some())
            }
        };

        let leave = LeaveRequest {
            id: self.leaves.next_id(),
            teacher_id: new.teacher_id,
            timetable_entry_id: new.timetable_entry_id,
            date: new.date,
            replacement_teacher_id,
            auto_assigned,
            status: LeaveStatus::Open,
            created_at: Utc::now(),
        };
        tracing::info!(
            "Leave {} opened: teacher {} entry {} on {} (replacement {:?}, auto {})",
            leave.id,
            leave.teacher_id,
            leave.timetable_entry_id,
            leave.date,
            leave.replacement_teacher_id,
            leave.auto_assigned
        );
        self.leaves.push(leave.clone());
        self.persist(&[Slot::Leaves]).await?;
        Ok(leave)
    }

    /// Resolves an open request and records the substitution.
    ///
    /// The substitute is `replacement` if given, else the one already on the
    /// request, else whatever the policy picks now. With none of the three the
    /// request is still resolved, just without a substitution.
    /// Returns `Ok(None)` for an unknown id.
    pub async fn resolve_leave(
        &mut self,
        id: Id,
        replacement: Option<Id>,
    ) -> AppResult<Option<LeaveRequest>> {
        let Some(leave) = self.leaves.get(id) else {
            tracing::warn!("resolve_leave: leave {} not found", id);
            return Ok(None);
        };
        if leave.status != LeaveStatus::Open {
            return Err(AppError::InvalidLeaveTransition {
                id,
                status: leave.status,
            });
        }

        let (teacher_id, entry_id, date) = (leave.teacher_id, leave.timetable_entry_id, leave.date);
        let assigned = replacement
            .or(leave.replacement_teacher_id)
            .or_else(|| self.pick_replacement(teacher_id, entry_id, date));

        if let Some(replacement_teacher_id) = assigned {
            // One substitution per (entry, date); a later resolution replaces it
            let existing = self
                .substitutions
                .iter_mut()
                .find(|s| s.timetable_entry_id == entry_id && s.date == date)
                .map(|sub| {
                    sub.replacement_teacher_id = replacement_teacher_id;
                    sub.original_teacher_id = teacher_id;
                    sub.id
                });
            let sub_id = match existing {
                Some(id) => id,
                None => {
                    let sub = Substitution {
                        id: self.substitutions.next_id(),
                        timetable_entry_id: entry_id,
                        date,
                        replacement_teacher_id,
                        original_teacher_id: teacher_id,
                    };
                    let id = sub.id;
                    self.substitutions.push(sub);
                    id
                }
            };
            tracing::info!(
                "Substitution {}: teacher {} covers entry {} on {}",
                sub_id,
                replacement_teacher_id,
                entry_id,
                date
            );
        } else {
            tracing::warn!("resolve_leave: leave {} resolved without a replacement", id);
        }

        let Some(leave) = self.leaves.get_mut(id) else {
            return Ok(None);
        };
        leave.replacement_teacher_id = assigned;
        leave.status = LeaveStatus::Resolved;
        let resolved = leave.clone();

        tracing::info!("Leave {} resolved", id);
        self.persist(&[Slot::Leaves, Slot::Substitutions]).await?;
        Ok(Some(resolved))
    }

    /// Rejects an open request. Returns `Ok(None)` for an unknown id.
    pub async fn reject_leave(&mut self, id: Id) -> AppResult<Option<LeaveRequest>> {
        let Some(leave) = self.leaves.get_mut(id) else {
            tracing::warn!("reject_leave: leave {} not found", id);
            return Ok(None);
        };
        if leave.status != LeaveStatus::Open {
            return Err(AppError::InvalidLeaveTransition {
                id,
                status: leave.status,
            });
        }
        leave.status = LeaveStatus::Rejected;
        let rejected = leave.clone();

        tracing::info!("Leave {} rejected", id);
        self.persist(&[Slot::Leaves]).await?;
        Ok(Some(rejected))
    }

    pub fn leave(&self, id: Id) -> Option<&LeaveRequest> {
        self.leaves.get(id)
    }

    /// All requests, optionally only those in `status`.
    pub fn leaves(&self, status: Option<LeaveStatus>) -> Vec<&LeaveRequest> {
        self.leaves
            .all()
            .iter()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .collect()
    }

    /// True while the teacher has an open request on `date` (today by default).
    /// Resolved and rejected requests do not count.
    pub fn is_teacher_on_leave(&self, teacher_id: Id, date: Option<NaiveDate>) -> bool {
        let date = date.unwrap_or_else(today);
        self.leaves
            .all()
            .iter()
            .any(|l| l.teacher_id == teacher_id && l.date == date && l.status == LeaveStatus::Open)
    }

    /// The teacher covering `timetable_entry_id` on `date`, if a substitution exists.
    /// The most recent resolution wins.
    pub fn replacement_for_entry(&self, timetable_entry_id: Id, date: NaiveDate) -> Option<Id> {
        self.substitutions
            .all()
            .iter()
            .rev()
            .find(|s| s.timetable_entry_id == timetable_entry_id && s.date == date)
            .map(|s| s.replacement_teacher_id)
    }

    pub fn substitutions(&self) -> &[Substitution] {
        self.substitutions.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        persistence::{KvBackend, MemoryKv, LEAVES_KEY, SUBSTITUTIONS_KEY},
        services::{
            replacement::FreeInSlot,
            store::test_support::{demo_store, fast_options, store_on},
        },
    };
    use std::sync::Arc;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn request(teacher_id: Id, entry: Id, date: NaiveDate, replacement: Option<Id>) -> NewLeave {
        NewLeave {
            teacher_id,
            timetable_entry_id: entry,
            date,
            replacement_teacher_id: replacement,
        }
    }

    #[tokio::test]
    async fn apply_auto_assigns_first_other_teacher() {
        let mut store = demo_store().await;
        let leave = store.apply_leave(request(1, 5, jan(10), None)).await.unwrap();

        assert_eq!(leave.replacement_teacher_id, Some(2));
        assert!(leave.auto_assigned);
        assert_eq!(leave.status, LeaveStatus::Open);
    }

    #[tokio::test]
    async fn explicit_replacement_is_not_auto_assigned() {
        let mut store = demo_store().await;
        let leave = store.apply_leave(request(1, 5, jan(10), Some(3))).await.unwrap();
        assert_eq!(leave.replacement_teacher_id, Some(3));
        assert!(!leave.auto_assigned);
    }

    #[tokio::test]
    async fn on_leave_until_resolved() {
        let mut store = demo_store().await;
        let leave = store.apply_leave(request(2, 2, jan(8), None)).await.unwrap();
        assert!(store.is_teacher_on_leave(2, Some(jan(8))));
        assert!(!store.is_teacher_on_leave(2, Some(jan(9))));
        assert!(!store.is_teacher_on_leave(1, Some(jan(8))));

        let resolved = store.resolve_leave(leave.id, None).await.unwrap().unwrap();
        assert_eq!(resolved.status, LeaveStatus::Resolved);
        assert_eq!(resolved.replacement_teacher_id, Some(1));
        assert!(!store.is_teacher_on_leave(2, Some(jan(8))));
    }

    #[tokio::test]
    async fn resolution_records_a_substitution() {
        let mut store = demo_store().await;
        let leave = store.apply_leave(request(1, 5, jan(10), None)).await.unwrap();
        assert_eq!(store.replacement_for_entry(5, jan(10)), None);

        store.resolve_leave(leave.id, Some(3)).await.unwrap();

        assert_eq!(store.replacement_for_entry(5, jan(10)), Some(3));
        assert_eq!(store.replacement_for_entry(5, jan(17)), None);
        let sub = &store.substitutions()[0];
        assert_eq!(sub.original_teacher_id, 1);
        assert_eq!(store.leave(leave.id).unwrap().replacement_teacher_id, Some(3));
    }

    #[tokio::test]
    async fn latest_resolution_replaces_the_substitute() {
        let mut store = demo_store().await;
        let first = store.apply_leave(request(1, 5, jan(10), None)).await.unwrap();
        let second = store.apply_leave(request(1, 5, jan(10), None)).await.unwrap();

        store.resolve_leave(first.id, Some(2)).await.unwrap();
        assert_eq!(store.replacement_for_entry(5, jan(10)), Some(2));

        store.resolve_leave(second.id, Some(3)).await.unwrap();
        assert_eq!(store.replacement_for_entry(5, jan(10)), Some(3));
        assert_eq!(store.substitutions().len(), 1);
    }

    #[tokio::test]
    async fn on_leave_defaults_to_today() {
        let mut store = demo_store().await;
        store.apply_leave(request(3, 1, today(), None)).await.unwrap();

        assert!(store.is_teacher_on_leave(3, None));
        assert!(!store.is_teacher_on_leave(2, None));
    }

    #[tokio::test]
    async fn terminal_requests_cannot_move_again() {
        let mut store = demo_store().await;
        let a = store.apply_leave(request(1, 1, jan(8), None)).await.unwrap();
        let b = store.apply_leave(request(3, 3, jan(9), None)).await.unwrap();
        store.resolve_leave(a.id, None).await.unwrap();
        store.reject_leave(b.id).await.unwrap();

        let again = store.resolve_leave(a.id, None).await;
        assert!(matches!(
            again,
            Err(AppError::InvalidLeaveTransition { status: LeaveStatus::Resolved, .. })
        ));
        let resolve_rejected = store.resolve_leave(b.id, Some(2)).await;
        assert!(matches!(
            resolve_rejected,
            Err(AppError::InvalidLeaveTransition { status: LeaveStatus::Rejected, .. })
        ));
        // a rejected request leaves no substitution behind
        assert_eq!(store.substitutions().len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_none() {
        let mut store = demo_store().await;
        assert!(store.resolve_leave(99, None).await.unwrap().is_none());
        assert!(store.reject_leave(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filter_by_status() {
        let mut store = demo_store().await;
        let a = store.apply_leave(request(1, 1, jan(8), None)).await.unwrap();
        store.apply_leave(request(2, 2, jan(8), None)).await.unwrap();
        store.reject_leave(a.id).await.unwrap();

        assert_eq!(store.leaves(None).len(), 2);
        assert_eq!(store.leaves(Some(LeaveStatus::Open)).len(), 1);
        assert_eq!(store.leaves(Some(LeaveStatus::Rejected))[0].id, a.id);
        assert!(store.leaves(Some(LeaveStatus::Resolved)).is_empty());
    }

    #[tokio::test]
    async fn leaves_survive_a_reload() {
        let kv = MemoryKv::new();
        let mut store = store_on(kv.clone()).await;
        let leave = store.apply_leave(request(1, 5, jan(10), None)).await.unwrap();
        store.resolve_leave(leave.id, None).await.unwrap();

        assert!(kv.get(LEAVES_KEY).await.unwrap().unwrap().contains("\"resolved\""));
        let reloaded = store_on(kv.clone()).await;
        assert_eq!(reloaded.leaves(None).len(), 1);
        assert_eq!(reloaded.replacement_for_entry(5, jan(10)), Some(2));
        assert!(kv.get(SUBSTITUTIONS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn free_in_slot_policy_avoids_busy_teachers() {
        let kv = MemoryKv::new();
        let mut store = AttendanceStore::load(Arc::new(kv), fast_options(), Box::new(FreeInSlot))
            .await
            .unwrap();
        // Entry 3 is Tuesday 09:00 taught by teacher 3; 2024-01-09 is a Tuesday.
        // Teacher 1 is on entry 4 at 10:00 only, so teacher 1 is free at 09:00.
        let leave = store.apply_leave(request(3, 3, jan(9), None)).await.unwrap();
        assert_eq!(leave.replacement_teacher_id, Some(1));

        // Teacher 2 now also teaches Monday 09:00, next to entry 1
        store
            .add_timetable_entry(crate::models::timetable::NewTimetableEntry {
                day: "Mon".into(),
                time_slot: "09:00 - 10:00".into(),
                subject_id: 2,
                teacher_id: 2,
                room: "Room 202".into(),
                course: "Computer Science".into(),
            })
            .await
            .unwrap();
        let other = store.apply_leave(request(1, 1, jan(8), None)).await.unwrap();
        assert_eq!(other.replacement_teacher_id, Some(3));
    }
}
