// src/web/mw_auth.rs
use crate::{error::AppError, models::user::SessionUser};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Session key holding the logged-in `SessionUser`.
pub const USER_SESSION_KEY: &str = "user";

/// The logged-in user, put in the request extensions by `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub SessionUser);

// Rejects requests without a logged-in user
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<SessionUser>(USER_SESSION_KEY).await {
        Ok(Some(user)) => {
            tracing::debug!("Auth MW: '{}' ({:?}) authenticated", user.username, user.role);
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::debug!("Auth MW: no user in session");
            Err(AppError::Unauthorized)
        }
        Err(e) => {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            Err(AppError::SessionError(format!("Failed to read session: {}", e)))
        }
    }
}
