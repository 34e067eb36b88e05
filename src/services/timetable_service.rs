// src/services/timetable_service.rs
use crate::{
    error::AppResult,
    models::{
        timetable::{NewTimetableEntry, TimetableEntry, TimetableEntryPatch},
        Id,
    },
    services::store::{AttendanceStore, Slot},
};
use chrono::Weekday;

impl AttendanceStore {
    pub fn timetable(&self) -> &[TimetableEntry] {
        self.timetable.all()
    }

    pub fn timetable_entry(&self, id: Id) -> Option<&TimetableEntry> {
        self.timetable.get(id)
    }

    pub fn timetable_for_day(&self, weekday: Weekday) -> Vec<&TimetableEntry> {
        self.timetable.all().iter().filter(|e| e.is_on(weekday)).collect()
    }

    /// Pairs of entry ids scheduled on the same day and time slot.
    pub fn slot_conflicts(&self) -> Vec<(Id, Id)> {
        let entries = self.timetable.all();
        let mut pairs = Vec::new();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// Adds an entry. Overlapping slots are accepted and only logged.
    pub async fn add_timetable_entry(
        &mut self,
        new: NewTimetableEntry,
    ) -> AppResult<TimetableEntry> {
        let entry = TimetableEntry {
            id: self.timetable.next_id(),
            day: new.day,
            time_slot: new.time_slot,
            subject_id: new.subject_id,
            teacher_id: new.teacher_id,
            room: new.room,
            course: new.course,
        };
        if let Some(other) = self.timetable.all().iter().find(|e| e.overlaps(&entry)) {
            tracing::warn!(
                "Timetable entry {} shares {} {} with entry {}",
                entry.id,
                entry.day,
                entry.time_slot,
                other.id
            );
        }
        tracing::info!("Adding timetable entry {}", entry.id);
        self.timetable.push(entry.clone());
        self.persist(&[Slot::Timetable]).await?;
        Ok(entry)
    }

    pub async fn update_timetable_entry(
        &mut self,
        id: Id,
        patch: TimetableEntryPatch,
    ) -> AppResult<()> {
        let Some(entry) = self.timetable.get_mut(id) else {
            tracing::warn!("update_timetable_entry: entry {} not found, ignoring", id);
            return Ok(());
        };
        if let Some(day) = patch.day {
            entry.day = day;
        }
        if let Some(slot) = patch.time_slot {
            entry.time_slot = slot;
        }
        if let Some(subject_id) = patch.subject_id {
            entry.subject_id = subject_id;
        }
        if let Some(teacher_id) = patch.teacher_id {
            entry.teacher_id = teacher_id;
        }
        if let Some(room) = patch.room {
            entry.room = room;
        }
        if let Some(course) = patch.course {
            entry.course = course;
        }
        tracing::info!("Updated timetable entry {}", id);
        self.persist(&[Slot::Timetable]).await
    }

    /// Removes the entry together with its attendance records.
    pub async fn delete_timetable_entry(&mut self, id: Id) -> AppResult<()> {
        if self.timetable.remove(id).is_none() {
            tracing::warn!("delete_timetable_entry: entry {} not found, ignoring", id);
        }
        let dropped = self.attendance.retain(|r| r.timetable_entry_id != id);
        tracing::info!("Deleted timetable entry {} and {} attendance records", id, dropped);
        self.persist(&[Slot::Timetable, Slot::Attendance]).await
    }
}
