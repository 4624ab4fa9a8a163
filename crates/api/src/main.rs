use std::net::SocketAddr;
use std::sync::Arc;

use tablebuilder_api::config::ServerConfig;
use tablebuilder_api::router::build_app_router;
use tablebuilder_api::state::AppState;
use tablebuilder_db::local::{FileKvStore, KvStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tablebuilder_api=debug,tablebuilder_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.demo_accounts_enabled {
        tracing::warn!("Demo admin accounts are enabled; set DEMO_ACCOUNTS_ENABLED=false in production");
    }

    // --- Local tier ---
    let kv: Arc<dyn KvStore> = Arc::new(
        FileKvStore::open(&config.storage.local_store_path).expect("Failed to open local store"),
    );
    tracing::info!(path = %config.storage.local_store_path.display(), "Local store ready");

    // --- Remote tier ---
    let pool = match &config.storage.database_url {
        Some(url) => {
            let pool = tablebuilder_db::create_pool(url).expect("Invalid DATABASE_URL");
            match tablebuilder_db::run_migrations(&pool).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::warn!(error = %e, "Database unavailable at startup, serving from local storage until it returns"),
            }
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running on local storage only");
            None
        }
    };

    // --- App state ---
    let state = AppState::new(config.clone(), pool, kv);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
