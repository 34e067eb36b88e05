// src/web/leave_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        leave::{LeaveRequest, LeaveStatus, NewLeave, Substitution},
        Id,
    },
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn leave_not_found(id: Id) -> AppError {
    AppError::NotFound(format!("Leave request {}", id))
}

// POST /api/leaves/
pub async fn create_leave(
    State(state): State<AppState>,
    Json(form): Json<NewLeave>,
) -> AppResult<(StatusCode, Json<LeaveRequest>)> {
    let leave = state.store.lock().await.apply_leave(form).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

#[derive(Debug, Deserialize)]
pub struct LeaveFilter {
    status: Option<LeaveStatus>,
}

// GET /api/leaves/?status=open
pub async fn list_leaves(
    State(state): State<AppState>,
    Query(filter): Query<LeaveFilter>,
) -> Json<Vec<LeaveRequest>> {
    let store = state.store.lock().await;
    Json(store.leaves(filter.status).into_iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    replacement_teacher_id: Option<Id>,
}

// PUT /api/leaves/{id}/resolve?replacement_teacher_id=
pub async fn resolve_leave(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Query(query): Query<ResolveQuery>,
) -> AppResult<Json<LeaveRequest>> {
    state
        .store
        .lock()
        .await
        .resolve_leave(id, query.replacement_teacher_id)
        .await?
        .map(Json)
        .ok_or_else(|| leave_not_found(id))
}

// PUT /api/leaves/{id}/reject
pub async fn reject_leave(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<LeaveRequest>> {
    state
        .store
        .lock()
        .await
        .reject_leave(id)
        .await?
        .map(Json)
        .ok_or_else(|| leave_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnLeave {
    teacher_id: Id,
    on_leave: bool,
}

// GET /api/teachers/{id}/on-leave?date=
pub async fn teacher_on_leave(
    State(state): State<AppState>,
    Path(teacher_id): Path<Id>,
    Query(query): Query<DateQuery>,
) -> Json<OnLeave> {
    let on_leave = state.store.lock().await.is_teacher_on_leave(teacher_id, query.date);
    Json(OnLeave { teacher_id, on_leave })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    timetable_entry_id: Id,
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementLookup {
    timetable_entry_id: Id,
    date: NaiveDate,
    replacement_teacher_id: Option<Id>,
}

// GET /api/substitutions/lookup?timetableEntryId=&date=
pub async fn lookup_substitution(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Json<ReplacementLookup> {
    let replacement = state
        .store
        .lock()
        .await
        .replacement_for_entry(query.timetable_entry_id, query.date);
    Json(ReplacementLookup {
        timetable_entry_id: query.timetable_entry_id,
        date: query.date,
        replacement_teacher_id: replacement,
    })
}

// GET /api/substitutions/
pub async fn list_substitutions(State(state): State<AppState>) -> Json<Vec<Substitution>> {
    Json(state.store.lock().await.substitutions().to_vec())
}
