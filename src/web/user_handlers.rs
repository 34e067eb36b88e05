// src/web/user_handlers.rs
// Read-only views available to every logged-in user.
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::DashboardStats,
        student::StudentSummary,
        subject::{Subject, SubjectView},
        teacher::TeacherSummary,
        timetable::TimetableEntry,
        Id,
    },
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Weekday;
use serde::Deserialize;

// GET /api/teachers/
pub async fn list_teachers(State(state): State<AppState>) -> Json<Vec<TeacherSummary>> {
    let store = state.store.lock().await;
    Json(store.teachers().iter().map(TeacherSummary::from).collect())
}

// GET /api/students/
pub async fn list_students(State(state): State<AppState>) -> Json<Vec<StudentSummary>> {
    let store = state.store.lock().await;
    Json(store.students().iter().map(StudentSummary::from).collect())
}

// GET /api/subjects/
pub async fn list_subjects(State(state): State<AppState>) -> Json<Vec<SubjectView>> {
    Json(state.store.lock().await.subject_views())
}

// GET /api/subjects/{id}/students
pub async fn subject_students(
    State(state): State<AppState>,
    Path(subject_id): Path<Id>,
) -> Json<Vec<StudentSummary>> {
    let store = state.store.lock().await;
    Json(
        store
            .enrolled_students(subject_id)
            .into_iter()
            .map(StudentSummary::from)
            .collect(),
    )
}

// GET /api/students/{id}/subjects
pub async fn student_subjects(
    State(state): State<AppState>,
    Path(student_id): Path<Id>,
) -> Json<Vec<Subject>> {
    let store = state.store.lock().await;
    Json(store.student_subjects(student_id).into_iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
pub struct TimetableQuery {
    day: Option<String>,
}

// GET /api/timetable/?day=Monday
pub async fn list_timetable(
    State(state): State<AppState>,
    Query(query): Query<TimetableQuery>,
) -> AppResult<Json<Vec<TimetableEntry>>> {
    let store = state.store.lock().await;
    let entries = match query.day {
        Some(day) => {
            let weekday: Weekday = day
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest(format!("unknown day '{}'", day)))?;
            store.timetable_for_day(weekday).into_iter().cloned().collect()
        }
        None => store.timetable().to_vec(),
    };
    Ok(Json(entries))
}

// GET /api/timetable/conflicts
pub async fn timetable_conflicts(State(state): State<AppState>) -> Json<Vec<(Id, Id)>> {
    Json(state.store.lock().await.slot_conflicts())
}

// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.store.lock().await.stats())
}
