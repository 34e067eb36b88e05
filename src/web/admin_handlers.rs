// src/web/admin_handlers.rs
// Admin-only mutations: directory CRUD, enrollment, face data and demo seeding.
// Updates and deletes of unknown ids are accepted (204) like the store does.
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::SeedSummary,
        student::{NewStudent, StudentPatch, StudentSummary},
        subject::{NewSubject, Subject, SubjectPatch},
        teacher::{NewTeacher, TeacherPatch, TeacherSummary},
        timetable::{NewTimetableEntry, TimetableEntry, TimetableEntryPatch},
        Id,
    },
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// --- Teachers ---

pub async fn create_teacher(
    State(state): State<AppState>,
    Json(form): Json<NewTeacher>,
) -> AppResult<(StatusCode, Json<TeacherSummary>)> {
    let teacher = state.store.lock().await.add_teacher(form).await?;
    Ok((StatusCode::CREATED, Json(TeacherSummary::from(&teacher))))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<TeacherPatch>,
) -> AppResult<StatusCode> {
    state.store.lock().await.update_teacher(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<StatusCode> {
    state.store.lock().await.delete_teacher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Students ---

pub async fn create_student(
    State(state): State<AppState>,
    Json(form): Json<NewStudent>,
) -> AppResult<(StatusCode, Json<StudentSummary>)> {
    let student = state.store.lock().await.add_student(form).await?;
    Ok((StatusCode::CREATED, Json(StudentSummary::from(&student))))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<StudentPatch>,
) -> AppResult<StatusCode> {
    state.store.lock().await.update_student(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<StatusCode> {
    state.store.lock().await.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDataForm {
    face_data: String,
}

// PUT /api/students/{id}/face
pub async fn update_face_data(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(form): Json<FaceDataForm>,
) -> AppResult<StatusCode> {
    if form.face_data.is_empty() {
        return Err(AppError::BadRequest("faceData must not be empty".into()));
    }
    state.store.lock().await.update_student_face_data(id, form.face_data).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Subjects ---

pub async fn create_subject(
    State(state): State<AppState>,
    Json(form): Json<NewSubject>,
) -> AppResult<(StatusCode, Json<Subject>)> {
    let subject = state.store.lock().await.add_subject(form).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<SubjectPatch>,
) -> AppResult<StatusCode> {
    state.store.lock().await.update_subject(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<StatusCode> {
    state.store.lock().await.delete_subject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/subjects/{subject_id}/students/{student_id}
pub async fn enroll_student(
    State(state): State<AppState>,
    Path((subject_id, student_id)): Path<(Id, Id)>,
) -> AppResult<StatusCode> {
    state.store.lock().await.enroll_student(student_id, subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/subjects/{subject_id}/students/{student_id}
pub async fn unenroll_student(
    State(state): State<AppState>,
    Path((subject_id, student_id)): Path<(Id, Id)>,
) -> AppResult<StatusCode> {
    state.store.lock().await.unenroll_student(student_id, subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Timetable ---

pub async fn create_timetable_entry(
    State(state): State<AppState>,
    Json(form): Json<NewTimetableEntry>,
) -> AppResult<(StatusCode, Json<TimetableEntry>)> {
    let entry = state.store.lock().await.add_timetable_entry(form).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_timetable_entry(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<TimetableEntryPatch>,
) -> AppResult<StatusCode> {
    state.store.lock().await.update_timetable_entry(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_timetable_entry(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<StatusCode> {
    state.store.lock().await.delete_timetable_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Demo data ---

#[derive(Debug, Serialize)]
pub struct SeededStudents {
    created: Vec<StudentSummary>,
    count: usize,
}

// POST /api/seed-demo-students
pub async fn seed_demo_students(State(state): State<AppState>) -> AppResult<Json<SeededStudents>> {
    let created = state.store.lock().await.seed_demo_students().await?;
    let created: Vec<StudentSummary> = created.iter().map(StudentSummary::from).collect();
    Ok(Json(SeededStudents {
        count: created.len(),
        created,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SeedAttendanceForm {
    #[serde(default = "default_seed_days")]
    days: u32,
    #[serde(default)]
    patterned: bool,
}

fn default_seed_days() -> u32 {
    7
}

// POST /api/seed-attendance
pub async fn seed_attendance(
    State(state): State<AppState>,
    Json(form): Json<SeedAttendanceForm>,
) -> AppResult<Json<SeedSummary>> {
    if form.days == 0 || form.days > 366 {
        return Err(AppError::BadRequest("days must be within 1..=366".into()));
    }
    let mut rng = StdRng::from_os_rng();
    let mut store = state.store.lock().await;
    let summary = if form.patterned {
        store.seed_patterned_attendance(form.days, &mut rng).await?
    } else {
        store.seed_attendance(form.days, &mut rng).await?
    };
    Ok(Json(summary))
}
