// src/main.rs
use attendify::{
    config::AppConfig,
    db,
    persistence::SqliteKv,
    services::{
        auth_service::AdminAccount,
        recognition_service::matcher_for,
        replacement::policy_for,
        store::{AttendanceStore, StoreOptions},
    },
    state::AppState,
    web,
};
use axum::serve;
use std::{env, sync::Arc};
use time::Duration;
use tokio::{net::TcpListener, sync::Mutex};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "attendify=debug,tower_http=info,sqlx=warn,tower_sessions=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            env::var("RUST_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
                .into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting Attendify...");

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // --- Database ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Could not initialise the database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect/migrate DB: {}", e));
        }
    };

    // --- Store ---
    let store = AttendanceStore::load(
        Arc::new(SqliteKv::new(db_pool.clone())),
        StoreOptions {
            password_cost: config.bcrypt_cost,
        },
        policy_for(config.replacement_policy),
    )
    .await
    .map_err(|e| {
        tracing::error!("❌ Could not load the attendance store: {}", e);
        anyhow::anyhow!("Failed to load store: {}", e)
    })?;

    let admin = AdminAccount::new(
        &config.admin_username,
        &config.admin_password,
        config.bcrypt_cost,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    let matcher = matcher_for(config.matcher, config.face_match_probability);
    tracing::info!("🙂 Face matcher: {}", matcher.name());

    // --- Sessions ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Failed to create session store: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate session store: {}", e))?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("🧹 Session cleanup task started.");

    let key = Key::try_from(config.session_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("SESSION_SECRET cannot be used as a signing key: {}", e))?;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_signed(key)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    tracing::info!("🔑 Session layer configured.");

    let app_state = AppState::new(
        Arc::new(Mutex::new(store)),
        admin,
        matcher,
        config.capture_interval,
    );

    // --- Listener ---
    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Could not listen on {}: {}", config.bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Listening on http://{}", config.bind_addr);

    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    );

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
