// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        user::{LoginForm, Role, SessionUser},
        Id,
    },
    services::store::AttendanceStore,
};

/// Admin credentials from configuration. The password is kept as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
}

impl AdminAccount {
    pub async fn new(username: &str, raw_password: &str, cost: u32) -> AppResult<Self> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(raw_password, cost).await?,
        })
    }
}

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while verifying password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Produces a bcrypt hash for a password.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while hashing password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// The account a login form names: its id (none for the admin) and bcrypt hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: Option<Id>,
    pub password_hash: String,
}

/// Finds the account a login attempt refers to. Only reads the store, so
/// callers can release the store lock before the password is checked.
pub fn lookup_credentials(
    store: &AttendanceStore,
    admin: &AdminAccount,
    form: &LoginForm,
) -> AppResult<Credentials> {
    let (id, password_hash) = match form.role {
        Role::Admin if form.username == admin.username => (None, admin.password_hash.clone()),
        Role::Admin => return Err(AppError::InvalidCredentials),
        Role::Teacher => {
            let teacher = store
                .teacher_by_username(&form.username)
                .ok_or(AppError::InvalidCredentials)?;
            (Some(teacher.id), teacher.password_hash.clone())
        }
        Role::Student => {
            let student = store
                .student_by_username(&form.username)
                .ok_or(AppError::InvalidCredentials)?;
            (Some(student.id), student.password_hash.clone())
        }
    };
    Ok(Credentials { id, password_hash })
}

/// Checks the form's password against `credentials` and builds the session user.
/// Unknown user and wrong password both give `InvalidCredentials`.
pub async fn authenticate(credentials: Credentials, form: &LoginForm) -> AppResult<SessionUser> {
    if !verify_password(&form.password, &credentials.password_hash).await? {
        tracing::warn!("Wrong password for {:?} '{}'", form.role, form.username);
        return Err(AppError::InvalidCredentials);
    }

    Ok(SessionUser {
        id: credentials.id,
        username: form.username.clone(),
        role: form.role,
    })
}
