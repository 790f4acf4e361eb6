mod config;
mod error;
mod handlers;
mod mapping;
mod monday;
mod routes;
mod state;

use anyhow::Result;
use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::routes::app_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monday_scheduler=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting monday.com scheduler backend");

    let state = AppState::from_config(&config)?;
    match &state.board {
        monday::BoardSelector::Id(id) => tracing::info!("Using board {}", id),
        monday::BoardSelector::Positional => {
            tracing::warn!("MONDAY_BOARD_ID not set, using the second visible board")
        }
    }

    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config.cors_allowed_origins.as_deref()));

    // Serve the scheduler client if it has been built
    let public_dir = std::path::Path::new(&config.public_dir);
    if public_dir.is_dir() {
        tracing::info!("Serving client from {}", config.public_dir);
        app.fallback_service(ServeDir::new(public_dir))
    } else {
        tracing::info!(
            "Client directory not found at {}, serving API only",
            config.public_dir
        );
        app
    }
}

/// Build CORS layer from a comma separated origin list.
///
/// Without a list, CORS is permissive (for development only).
fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<_> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping...");
}
