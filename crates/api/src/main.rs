use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engage_api::config::ServerConfig;
use engage_api::router::build_app_router;
use engage_api::seed::seed_catalog;
use engage_api::state::AppState;
use engage_db::memory::MemoryStore;
use engage_db::store::{AnnotationStore, PgStore, VideoCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "engage_api=debug,engage_db=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Stores ---
    let (videos, annotations): (Arc<dyn VideoCatalog>, Arc<dyn AnnotationStore>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = engage_db::create_pool(database_url)
                    .await
                    .context("Failed to connect to database")?;
                tracing::info!("Database connection pool created");

                engage_db::health_check(&pool)
                    .await
                    .context("Database health check failed")?;
                tracing::info!("Database health check passed");

                engage_db::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");

                let store = Arc::new(PgStore::new(pool));
                (
                    store.clone() as Arc<dyn VideoCatalog>,
                    store as Arc<dyn AnnotationStore>,
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, annotations are kept in memory only");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn VideoCatalog>,
                    store as Arc<dyn AnnotationStore>,
                )
            }
        };

    // --- Seeding ---
    if config.seed_assets {
        let report = seed_catalog(
            videos.as_ref(),
            config.assets_dir.clone(),
            config.assets_url_prefix.clone(),
        )
        .await
        .context("Failed to seed video catalog")?;
        tracing::info!(
            added = report.added,
            skipped = report.skipped,
            "Video catalog seeded"
        );
    }

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        videos,
        annotations,
    };

    // --- Router ---
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
