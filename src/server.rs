//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, CORS)
//! - Static serving of the normalized cover images
//! - Graceful shutdown handling

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::config::ServerConfig;
use crate::middleware::request_context;
use crate::routes::{api_info, auth, books, health, not_found};
use crate::state::ServerState;

/// Headroom for multipart framing and the `book` JSON part on top of the
/// configured maximum image size.
const UPLOAD_SLACK: usize = 1024 * 1024;

/// Build the Axum router with all routes and middleware.
///
/// Routes are divided into:
/// - Public routes: info, health, signup/login, book reads, /images
/// - Protected routes: every book mutation (bearer token required)
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/books", get(books::list_books))
        .route("/api/books/bestrating", get(books::best_rated))
        .route("/api/books/{id}", get(books::get_book));

    let protected_routes = Router::new()
        .route("/api/books", post(books::create_book))
        .route("/api/books/{id}", put(books::update_book))
        .route("/api/books/{id}", delete(books::delete_book))
        .route("/api/books/{id}/rating", post(books::rate_book))
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_size() + UPLOAD_SLACK,
        ))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/images", ServeDir::new(&state.config.image_dir))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// Initializes structured logging, opens the store, creates the image
/// directory, binds the TCP listener and serves until SIGTERM/Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    // Create server state
    let state = Arc::new(ServerState::new(config.clone())?);

    // Build router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting grimoire server on {} (image dir: {}, db: {})",
        addr,
        config.image_dir,
        config.db_path
    );
    tracing::info!(
        "Timeout: {}s, Max upload: {}MB, Rate limit: {} req/min/user",
        config.timeout_secs,
        config.max_upload_size_mb,
        config.rate_limit_per_minute
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
