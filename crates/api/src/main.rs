use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songforge_api::callbacks::dispatch::CallbackDispatcher;
use songforge_api::callbacks::idempotency::IdempotencyGuard;
use songforge_api::callbacks::result_cache::CoverResultCache;
use songforge_api::callbacks::CallbackContext;
use songforge_api::config::ServerConfig;
use songforge_api::router::build_app_router;
use songforge_api::state::AppState;
use songforge_media::{HttpRelocator, S3BlobStore};
use songforge_provider::HttpProviderClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = songforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    songforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    songforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Media store and relocator ---
    let store = S3BlobStore::from_env(&config.media_bucket, &config.media_public_base_url).await;
    let relocator = Arc::new(HttpRelocator::new(Arc::new(store)));
    tracing::info!(bucket = %config.media_bucket, "Media store initialized");

    // --- Provider client ---
    let cover_service = Arc::new(HttpProviderClient::new(
        &config.provider_base_url,
        &config.provider_api_key,
    ));

    // --- Delivery dedup and cover result cache ---
    let guard = Arc::new(IdempotencyGuard::with_default_ttl());
    let cover_results = Arc::new(CoverResultCache::with_default_retention());

    // --- Callback dispatcher ---
    let dispatcher_cancel = CancellationToken::new();
    let ctx = CallbackContext {
        pool: pool.clone(),
        relocator,
        cover_service,
        guard: Arc::clone(&guard),
        cover_results: Arc::clone(&cover_results),
    };
    let (sender, dispatcher_handle) = CallbackDispatcher::start(
        ctx,
        config.callback_queue_capacity,
        dispatcher_cancel.clone(),
    );
    tracing::info!(
        capacity = config.callback_queue_capacity,
        "Callback dispatcher started"
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        guard,
        cover_results,
        dispatcher: sender,
    };

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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop intake and let the dispatcher drain queued callbacks.
    dispatcher_cancel.cancel();
    let drain = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        dispatcher_handle,
    )
    .await;
    if drain.is_err() {
        tracing::warn!("Callback dispatcher did not drain before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
