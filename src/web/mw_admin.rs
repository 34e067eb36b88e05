// src/web/mw_admin.rs
//! Role checks. Both run after `require_auth`.

use crate::{error::AppError, web::mw_auth::CurrentUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Only the configured admin gets through.
pub async fn require_admin(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.is_admin() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: access denied for '{}' ({:?})", user.username, user.role);
        Err(AppError::Forbidden)
    }
}

/// Admin or teacher.
pub async fn require_staff(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.is_staff() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Staff MW: access denied for '{}' ({:?})", user.username, user.role);
        Err(AppError::Forbidden)
    }
}
