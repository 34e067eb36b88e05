// src/services/analytics_service.rs
//! Dashboard aggregates and the absence forecast.

use crate::{
    models::{
        attendance::{AttendanceStatus, DailyAbsences, ForecastPoint, SlotBreakdown},
        Id,
    },
    services::store::AttendanceStore,
};
use chrono::{Datelike, Days, NaiveDate};

impl AttendanceStore {
    /// Absent records per day for the `days` days ending at `until` (inclusive),
    /// oldest first. Days without records count as zero.
    pub fn daily_absences(&self, days: u32, until: NaiveDate) -> Vec<DailyAbsences> {
        if days == 0 {
            return Vec::new();
        }
        let Some(start) = until.checked_sub_days(Days::new(u64::from(days - 1))) else {
            return Vec::new();
        };
        start
            .iter_days()
            .take_while(|d| *d <= until)
            .map(|date| DailyAbsences {
                date,
                absent: self
                    .attendance
                    .all()
                    .iter()
                    .filter(|r| r.date == date && r.status == AttendanceStatus::Absent)
                    .count(),
            })
            .collect()
    }

    /// Present/absent totals per time slot over the entries scheduled on the
    /// weekday of `date`, counting only that date's records. Slots keep
    /// timetable order.
    pub fn timeslot_breakdown(&self, date: NaiveDate) -> Vec<SlotBreakdown> {
        let mut slots: Vec<SlotBreakdown> = Vec::new();
        for entry in self.timetable_for_day(date.weekday()) {
            let slot_name = entry.time_slot.trim();
            let idx = match slots.iter().position(|s| s.time_slot == slot_name) {
                Some(idx) => idx,
                None => {
                    slots.push(SlotBreakdown {
                        time_slot: slot_name.to_string(),
                        present: 0,
                        absent: 0,
                    });
                    slots.len() - 1
                }
            };
            for record in self.attendance_for_class_on(entry.id, date) {
                match record.status {
                    AttendanceStatus::Present => slots[idx].present += 1,
                    AttendanceStatus::Absent => slots[idx].absent += 1,
                }
            }
        }
        slots
    }

    /// Share of class days the student was present, in percent.
    /// `None` while the subject has no recorded class at all.
    pub fn attendance_percentage(&self, student_id: Id, subject_id: Id) -> Option<f64> {
        let counts = self.attendance_counts(student_id, subject_id);
        if counts.total_classes == 0 {
            return None;
        }
        Some(counts.present_count as f64 / counts.total_classes as f64 * 100.0)
    }
}

/// Projects the next `horizon` days with a least-squares line through the
/// history (x = day index). Projections are floored at zero. A single point
/// is projected flat; an empty history projects nothing.
pub fn forecast_absences(history: &[DailyAbsences], horizon: u32) -> Vec<ForecastPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let n = history.len() as f64;
    let (slope, intercept) = if history.len() < 2 {
        (0.0, last.absent as f64)
    } else {
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = history.iter().map(|d| d.absent as f64).sum::<f64>() / n;
        let (mut num, mut den) = (0.0, 0.0);
        for (i, day) in history.iter().enumerate() {
            let dx = i as f64 - mean_x;
            num += dx * (day.absent as f64 - mean_y);
            den += dx * dx;
        }
        let slope = num / den;
        (slope, mean_y - slope * mean_x)
    };

    (1..=horizon)
        .filter_map(|step| {
            let date = last.date.checked_add_days(Days::new(u64::from(step)))?;
            let x = n - 1.0 + f64::from(step);
            Some(ForecastPoint {
                date,
                expected_absent: (intercept + slope * x).max(0.0),
            })
        })
        .collect()
}
