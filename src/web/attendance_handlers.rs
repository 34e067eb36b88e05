// src/web/attendance_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{AttendanceCounts, AttendanceRecord, MarkAttendance},
        Id,
    },
    services::{capture_service::CaptureStatus, recognition_service::Recognition},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// POST /api/attendance/mark
pub async fn mark(
    State(state): State<AppState>,
    Json(form): Json<MarkAttendance>,
) -> AppResult<Json<AttendanceRecord>> {
    let record = state
        .store
        .lock()
        .await
        .mark_attendance(form.student_id, form.subject_id, form.status, form.timetable_entry_id)
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct ClassQuery {
    date: Option<NaiveDate>,
}

// GET /api/attendance/class/{entry}?date=YYYY-MM-DD
pub async fn class_attendance(
    State(state): State<AppState>,
    Path(entry_id): Path<Id>,
    Query(query): Query<ClassQuery>,
) -> Json<Vec<AttendanceRecord>> {
    let store = state.store.lock().await;
    let records = match query.date {
        Some(date) => store.attendance_for_class_on(entry_id, date),
        None => store.attendance_for_class(entry_id),
    };
    Json(records.into_iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsQuery {
    student_id: Id,
    subject_id: Id,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsResponse {
    #[serde(flatten)]
    counts: AttendanceCounts,
    percentage: Option<f64>,
}

// GET /api/attendance/counts?studentId=&subjectId=
pub async fn counts(
    State(state): State<AppState>,
    Query(query): Query<CountsQuery>,
) -> Json<CountsResponse> {
    let store = state.store.lock().await;
    Json(CountsResponse {
        counts: store.attendance_counts(query.student_id, query.subject_id),
        percentage: store.attendance_percentage(query.student_id, query.subject_id),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeForm {
    image: String,
    timetable_entry_id: Option<Id>,
}

// POST /api/attendance/recognize
pub async fn recognize(
    State(state): State<AppState>,
    Json(form): Json<RecognizeForm>,
) -> AppResult<Json<Recognition>> {
    if form.image.is_empty() {
        return Err(AppError::BadRequest("image must not be empty".into()));
    }
    let outcome = state
        .store
        .lock()
        .await
        .recognize(state.matcher.as_ref(), &form.image, form.timetable_entry_id)
        .await?;
    Ok(Json(outcome))
}

// --- Capture loop ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCaptureQuery {
    interval_ms: Option<u64>,
}

// POST /api/attendance/capture/{entry}/start?intervalMs=
pub async fn start_capture(
    State(state): State<AppState>,
    Path(entry_id): Path<Id>,
    Query(query): Query<StartCaptureQuery>,
) -> AppResult<Json<CaptureStatus>> {
    let interval = query
        .interval_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or(state.capture_interval);
    let status = state
        .captures
        .start(state.store.clone(), state.matcher.clone(), entry_id, interval)
        .await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct FrameForm {
    image: String,
}

// POST /api/attendance/capture/{entry}/frame
pub async fn submit_frame(
    State(state): State<AppState>,
    Path(entry_id): Path<Id>,
    Json(form): Json<FrameForm>,
) -> AppResult<StatusCode> {
    state.captures.submit_frame(entry_id, form.image).await?;
    Ok(StatusCode::ACCEPTED)
}

// GET /api/attendance/capture/{entry}
pub async fn capture_status(
    State(state): State<AppState>,
    Path(entry_id): Path<Id>,
) -> AppResult<Json<CaptureStatus>> {
    state
        .captures
        .status(entry_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("capture session for entry {}", entry_id)))
}

// POST /api/attendance/capture/{entry}/stop
pub async fn stop_capture(
    State(state): State<AppState>,
    Path(entry_id): Path<Id>,
) -> AppResult<Json<CaptureStatus>> {
    state
        .captures
        .stop(entry_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("capture session for entry {}", entry_id)))
}
