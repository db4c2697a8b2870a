//! Codeathon - Application Entry Point
//!
//! This is the main entry point for the Codeathon evaluation server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use bollard::Docker;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codeathon::{
    config::CONFIG,
    db,
    dispatcher::Dispatcher,
    handlers,
    judge::DockerJudge,
    state::AppState,
    store::PgSubmissionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Codeathon server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&CONFIG.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Docker client for the judge sandbox
    tracing::info!("Connecting to Docker...");
    let docker = Docker::connect_with_socket_defaults()?;
    let docker_info = docker.version().await?;
    tracing::info!(
        "Connected to Docker version: {}",
        docker_info.version.unwrap_or_default()
    );

    // Wire the dispatcher over its store and judge capabilities
    let store = Arc::new(PgSubmissionStore::new(db_pool));
    let judge = Arc::new(DockerJudge::new(docker, CONFIG.judge.clone()));
    let dispatcher = Dispatcher::new(store, judge, CONFIG.dispatcher.clone());

    // Start the background evaluation loop; it runs for the process lifetime
    let background = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.auto_evaluate().await })
    };

    // Create application state
    let state = AppState::new(dispatcher.clone(), CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the in-flight sweep finish before exiting
    tracing::info!("Shutting down background evaluation loop...");
    dispatcher.shutdown();
    background.await?;

    tracing::info!("Codeathon shutdown complete");
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
