// src/services/capture_service.rs
//! Periodic recognition while a class is being captured.
//!
//! One session per timetable entry. Clients push the latest camera frame with
//! `submit_frame`; a background task wakes on a fixed interval, runs the
//! matcher on the newest frame (if it changed since the last tick) and marks
//! newly recognised students present. Stopping aborts the task.

use crate::{
    error::{AppError, AppResult},
    models::Id,
    services::{recognition_service::FaceMatcher, store::AttendanceStore},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::{BTreeSet, HashMap}, sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};

pub type SharedStore = Arc<Mutex<AttendanceStore>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatus {
    pub timetable_entry_id: Id,
    pub running: bool,
    pub started_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub recognized: BTreeSet<Id>,
    pub last_error: Option<String>,
}

struct CaptureSession {
    frames: watch::Sender<Option<String>>,
    status: Arc<Mutex<CaptureStatus>>,
    task: JoinHandle<()>,
}

/// Running capture sessions, keyed by timetable entry.
#[derive(Clone, Default)]
pub struct CaptureManager {
    sessions: Arc<Mutex<HashMap<Id, CaptureSession>>>,
}

impl CaptureManager {
    /// Starts capturing for the entry. If a session is already running for it,
    /// that session's status is returned and nothing new is spawned.
    pub async fn start(
        &self,
        store: SharedStore,
        matcher: Arc<dyn FaceMatcher>,
        timetable_entry_id: Id,
        interval: Duration,
    ) -> AppResult<CaptureStatus> {
        if store.lock().await.timetable_entry(timetable_entry_id).is_none() {
            return Err(AppError::NotFound(format!("timetable entry {}", timetable_entry_id)));
        }
        if interval.is_zero() {
            return Err(AppError::BadRequest("capture interval must be positive".into()));
        }

        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(&timetable_entry_id) {
            if !existing.task.is_finished() {
                tracing::debug!("Capture for entry {} already running", timetable_entry_id);
                return Ok(existing.status.lock().await.clone());
            }
        }

        let status = CaptureStatus {
            timetable_entry_id,
            running: true,
            started_at: Utc::now(),
            frames_processed: 0,
            recognized: BTreeSet::new(),
            last_error: None,
        };
        let shared_status = Arc::new(Mutex::new(status.clone()));
        let (frames, frames_rx) = watch::channel(None);
        let task = tokio::spawn(capture_loop(
            store,
            matcher,
            timetable_entry_id,
            interval,
            frames_rx,
            shared_status.clone(),
        ));

        tracing::info!(
            "📷 Capture started for entry {} (every {} ms)",
            timetable_entry_id,
            interval.as_millis()
        );
        sessions.insert(
            timetable_entry_id,
            CaptureSession {
                frames,
                status: shared_status,
                task,
            },
        );
        Ok(status)
    }

    /// Replaces the pending frame of the entry's session.
    pub async fn submit_frame(&self, timetable_entry_id: Id, frame: String) -> AppResult<()> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(&timetable_entry_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("capture session for entry {}", timetable_entry_id))
            })?;
        session.frames.send_replace(Some(frame));
        Ok(())
    }

    pub async fn status(&self, timetable_entry_id: Id) -> Option<CaptureStatus> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&timetable_entry_id)?;
        let mut status = session.status.lock().await.clone();
        status.running = !session.task.is_finished();
        Some(status)
    }

    /// Aborts the entry's session and returns its final status.
    pub async fn stop(&self, timetable_entry_id: Id) -> Option<CaptureStatus> {
        let session = self.sessions.lock().await.remove(&timetable_entry_id)?;
        session.task.abort();
        let mut status = session.status.lock().await.clone();
        status.running = false;
        tracing::info!(
            "📷 Capture stopped for entry {}: {} frames, {} students recognised",
            timetable_entry_id,
            status.frames_processed,
            status.recognized.len()
        );
        Some(status)
    }
}

async fn capture_loop(
    store: SharedStore,
    matcher: Arc<dyn FaceMatcher>,
    timetable_entry_id: Id,
    interval: Duration,
    mut frames: watch::Receiver<Option<String>>,
    status: Arc<Mutex<CaptureStatus>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match frames.has_changed() {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break, // session dropped
        }
        let Some(frame) = frames.borrow_and_update().clone() else {
            continue;
        };

        let outcome =
            recognize_frame(&store, matcher.as_ref(), timetable_entry_id, &frame, &status).await;

        let mut status = status.lock().await;
        status.frames_processed += 1;
        match outcome {
            Ok(Some(student_id)) => {
                status.recognized.insert(student_id);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Capture for entry {}: {}", timetable_entry_id, e);
                status.last_error = Some(e.to_string());
            }
        }
    }
}

/// One tick: identify, then mark present unless already recognised in this
/// session. Returns the newly marked student.
async fn recognize_frame(
    store: &SharedStore,
    matcher: &dyn FaceMatcher,
    timetable_entry_id: Id,
    frame: &str,
    status: &Mutex<CaptureStatus>,
) -> AppResult<Option<Id>> {
    let mut store = store.lock().await;
    let Some(student_id) = store.identify(matcher, frame, Some(timetable_entry_id))? else {
        return Ok(None);
    };
    if status.lock().await.recognized.contains(&student_id) {
        return Ok(None);
    }
    store.mark_present(student_id, timetable_entry_id).await?;
    tracing::info!("📷 Entry {}: recognised student {}", timetable_entry_id, student_id);
    Ok(Some(student_id))
}
