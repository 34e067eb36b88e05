// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        student::{NewStudent, StudentSummary},
        user::{LoginForm, SessionUser},
    },
    services::auth_service,
    state::AppState,
    web::mw_auth::{CurrentUser, USER_SESSION_KEY},
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tower_sessions::Session;

// POST /api/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<SessionUser>> {
    tracing::info!("Login attempt for {:?} '{}'", form.role, form.username);

    let credentials = {
        let store = state.store.lock().await;
        auth_service::lookup_credentials(&store, &state.admin, &form)?
    };
    let user = auth_service::authenticate(credentials, &form).await?;

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle session id: {}", e)))?;
    session
        .insert(USER_SESSION_KEY, &user)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to write session: {}", e)))?;

    tracing::info!("✅ Login successful for '{}'", user.username);
    Ok(Json(user))
}

// POST /api/logout
pub async fn handle_logout(session: Session) -> AppResult<StatusCode> {
    let user: Option<SessionUser> = session.get(USER_SESSION_KEY).await.ok().flatten();

    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to delete session: {}", e)))?;

    match user {
        Some(user) => tracing::info!("🚪 '{}' logged out.", user.username),
        None => tracing::info!("🚪 Anonymous session closed."),
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<SessionUser> {
    Json(user)
}

// POST /api/register
// Student self-registration, usernames must be free.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(form): Json<NewStudent>,
) -> AppResult<(StatusCode, Json<StudentSummary>)> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest("username and password are required".into()));
    }

    let mut store = state.store.lock().await;
    if store.student_by_username(&form.username).is_some() {
        tracing::warn!("Register: username '{}' already taken", form.username);
        return Err(AppError::BadRequest(format!("username '{}' is taken", form.username)));
    }
    let student = store.add_student(form).await?;
    Ok((StatusCode::CREATED, Json(StudentSummary::from(&student))))
}
