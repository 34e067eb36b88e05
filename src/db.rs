// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool(database_url: &str) -> AppResult<SqlitePool> {
    tracing::info!("Connecting to database: {}", database_url);

    // Create the file when missing, wait on locks instead of failing
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    // Runs the SQL files in ./migrations (embedded at compile time)
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations done.");

    Ok(pool)
}
