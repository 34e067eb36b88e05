// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, str::FromStr, time::Duration};

/// Which face matcher the recognition endpoints use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Random,
    Exact,
}

/// Which strategy picks a substitute teacher for a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    FirstOther,
    FreeInSlot,
}

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
    pub capture_interval: Duration,
    pub face_match_probability: f64,
    pub matcher: MatcherKind,
    pub replacement_policy: PolicyKind,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < 64 {
            tracing::warn!("⚠️ SESSION_SECRET is short, signed cookies need at least 64 bytes!");
        }

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("⚠️ ADMIN_PASSWORD not set, falling back to the default password");
            "admin".into()
        });

        let face_match_probability: f64 = parse_or("FACE_MATCH_PROBABILITY", 0.8)?;
        if !(0.0..=1.0).contains(&face_match_probability) {
            return Err(AppError::Config(format!(
                "FACE_MATCH_PROBABILITY must be within 0..=1, got {}",
                face_match_probability
            )));
        }

        let matcher = match env::var("FACE_MATCHER").as_deref() {
            Err(_) | Ok("random") => MatcherKind::Random,
            Ok("exact") => MatcherKind::Exact,
            Ok(other) => return Err(AppError::Config(format!("unknown FACE_MATCHER '{}'", other))),
        };

        let replacement_policy = match env::var("REPLACEMENT_POLICY").as_deref() {
            Err(_) | Ok("first-other") => PolicyKind::FirstOther,
            Ok("free-in-slot") => PolicyKind::FreeInSlot,
            Ok(other) => {
                return Err(AppError::Config(format!("unknown REPLACEMENT_POLICY '{}'", other)))
            }
        };

        Ok(Self {
            database_url,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            session_secret,
            admin_username,
            admin_password,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            capture_interval: Duration::from_millis(parse_or("CAPTURE_INTERVAL_MS", 2000u64)?),
            face_match_probability,
            matcher,
            replacement_policy,
        })
    }
}

/// Reads `key` and parses it, using `default` when the variable is unset.
fn parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}='{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
