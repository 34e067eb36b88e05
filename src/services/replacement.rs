// src/services/replacement.rs
//! Strategies that pick the substitute teacher for a leave request.

use crate::{
    config::PolicyKind,
    models::{leave::Substitution, teacher::Teacher, timetable::TimetableEntry, Id},
};
use chrono::{Datelike, NaiveDate};

/// Everything a policy may look at when choosing a substitute.
pub struct ReplacementContext<'a> {
    pub teachers: &'a [Teacher],
    pub timetable: &'a [TimetableEntry],
    pub substitutions: &'a [Substitution],
    pub requester_id: Id,
    pub timetable_entry_id: Id,
    pub date: NaiveDate,
}

pub trait ReplacementPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// The substitute for the request, `None` when nobody qualifies.
    fn choose(&self, ctx: &ReplacementContext<'_>) -> Option<Id>;
}

/// First teacher in the collection who is not the requester.
/// Does not look at anybody's timetable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOtherTeacher;

impl ReplacementPolicy for FirstOtherTeacher {
    fn name(&self) -> &'static str {
        "first-other"
    }

    fn choose(&self, ctx: &ReplacementContext<'_>) -> Option<Id> {
        ctx.teachers
            .iter()
            .map(|t| t.id)
            .find(|&id| id != ctx.requester_id)
    }
}

/// First other teacher who is free in that slot: not teaching an entry on the
/// same day and time slot, and not already substituting one on that date.
/// Falls back to `FirstOtherTeacher` when the entry itself is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeInSlot;

impl ReplacementPolicy for FreeInSlot {
    fn name(&self) -> &'static str {
        "free-in-slot"
    }

    fn choose(&self, ctx: &ReplacementContext<'_>) -> Option<Id> {
        let Some(entry) = ctx.timetable.iter().find(|e| e.id == ctx.timetable_entry_id) else {
            tracing::debug!(
                "free-in-slot: entry {} unknown, using first other teacher",
                ctx.timetable_entry_id
            );
            return FirstOtherTeacher.choose(ctx);
        };

        // Entries sharing the slot, only meaningful if the date falls on that weekday
        let same_slot: Vec<&TimetableEntry> = ctx
            .timetable
            .iter()
            .filter(|e| e.overlaps(entry))
            .filter(|e| e.weekday().map_or(true, |wd| wd == ctx.date.weekday()))
            .collect();

        let is_busy = |teacher_id: Id| {
            let teaching = same_slot.iter().any(|e| e.teacher_id == teacher_id);
            let covering = ctx.substitutions.iter().any(|s| {
                s.date == ctx.date
                    && s.replacement_teacher_id == teacher_id
                    && same_slot.iter().any(|e| e.id == s.timetable_entry_id)
            });
            teaching || covering
        };

        ctx.teachers
            .iter()
            .map(|t| t.id)
            .filter(|&id| id != ctx.requester_id)
            .find(|&id| !is_busy(id))
    }
}

pub fn policy_for(kind: PolicyKind) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyKind::FirstOther => Box::new(FirstOtherTeacher),
        PolicyKind::FreeInSlot => Box::new(FreeInSlot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(id: Id) -> Teacher {
        Teacher {
            id,
            name: format!("Teacher {id}"),
            email: format!("t{id}@example.com"),
            username: format!("t{id}"),
            password_hash: String::new(),
            subject: None,
            address: None,
        }
    }

    fn entry(id: Id, day: &str, slot: &str, teacher_id: Id) -> TimetableEntry {
        TimetableEntry {
            id,
            day: day.into(),
            time_slot: slot.into(),
            subject_id: 1,
            teacher_id,
            room: "Room 101".into(),
            course: "Computer Science".into(),
        }
    }

    // 2024-01-08 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn first_other_skips_only_the_requester() {
        let teachers = [teacher(1), teacher(2), teacher(3)];
        let mut ctx = ReplacementContext {
            teachers: &teachers,
            timetable: &[],
            substitutions: &[],
            requester_id: 1,
            timetable_entry_id: 5,
            date: monday(),
        };
        assert_eq!(FirstOtherTeacher.choose(&ctx), Some(2));
        ctx.requester_id = 2;
        assert_eq!(FirstOtherTeacher.choose(&ctx), Some(1));

        let alone = [teacher(1)];
        ctx.teachers = &alone;
        ctx.requester_id = 1;
        assert_eq!(FirstOtherTeacher.choose(&ctx), None);
    }

    #[test]
    fn free_in_slot_skips_teachers_busy_in_that_slot() {
        let teachers = [teacher(1), teacher(2), teacher(3), teacher(4)];
        let timetable = [
            entry(1, "Monday", "09:00 - 10:00", 1),
            entry(2, "Monday", "09:00 - 10:00", 2),
            entry(3, "Monday", "09:00 - 10:00", 5),
        ];
        // teacher 3 already covers entry 3 on that Monday
        let substitutions = [Substitution {
            id: 1,
            timetable_entry_id: 3,
            date: monday(),
            replacement_teacher_id: 3,
            original_teacher_id: 5,
        }];
        let ctx = ReplacementContext {
            teachers: &teachers,
            timetable: &timetable,
            substitutions: &substitutions,
            requester_id: 1,
            timetable_entry_id: 1,
            date: monday(),
        };
        assert_eq!(FreeInSlot.choose(&ctx), Some(4));
        assert_eq!(FirstOtherTeacher.choose(&ctx), Some(2));
    }

    #[test]
    fn free_in_slot_falls_back_for_unknown_entries() {
        let teachers = [teacher(1), teacher(2)];
        let ctx = ReplacementContext {
            teachers: &teachers,
            timetable: &[],
            substitutions: &[],
            requester_id: 2,
            timetable_entry_id: 77,
            date: monday(),
        };
        assert_eq!(FreeInSlot.choose(&ctx), Some(1));
    }
}
