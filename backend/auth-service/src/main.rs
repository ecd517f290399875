/// Authentication Service Main Entry Point
///
/// Starts the HTTP server with:
/// - PostgreSQL connection pool (with migrations)
/// - Google ID-token verifier
/// - Email service (SMTP, no-op without configuration)
/// - Expired-credential sweep (background task)
use anyhow::{Context, Result};
use auth_service::{
    config::Settings,
    http::{build_router, AppState},
    security::TokenCodec,
    services::{Authenticator, EmailService, GoogleIdTokenVerifier, PasswordResetFlow},
    store::{CredentialStore, PgCredentialStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// How often the background sweep removes expired token records.
const TOKEN_SWEEP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "auth_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Authentication Service");

    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let email_service =
        EmailService::new(&settings.email).context("Failed to initialize email service")?;
    if email_service.is_enabled() {
        info!("Email service initialized with SMTP");
    } else {
        info!("Email service running in no-op mode (SMTP not configured)");
    }

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db_pool.clone()));
    let verifier = Arc::new(GoogleIdTokenVerifier::new(settings.google.client_id.clone()));
    let codec = TokenCodec::new(&settings.jwt.secret, settings.jwt.access_ttl_secs);

    let authenticator = Arc::new(Authenticator::new(
        store.clone(),
        verifier,
        codec.clone(),
        settings.jwt.refresh_ttl_days,
    ));
    let reset_flow = Arc::new(PasswordResetFlow::new(
        store.clone(),
        Arc::new(email_service),
    ));

    // Background sweep for expired refresh and reset tokens
    let sweep_store = store.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(TOKEN_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match sweep_store.purge_expired_tokens(chrono::Utc::now()).await {
                Ok(purged) if purged > 0 => info!(purged, "Expired token records removed"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Expired-token sweep failed"),
            }
        }
    });

    let state = AppState {
        authenticator,
        reset_flow,
        codec,
    };
    let app = build_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Authentication service shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
