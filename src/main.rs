//! BioPage Backend
//!
//! Link-in-bio service: accounts, a draft-based profile editor and public
//! profile pages, backed by SQLite.

mod api;
mod auth;
mod config;
mod db;
mod draft;
mod errors;
mod models;
mod public;
mod storage;
mod themes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{LogMailer, SessionGateway, SqliteAuthProvider};
use config::{Config, LogFormat};
use db::Repository;
use draft::DraftRegistry;
use storage::{AvatarStore, LocalAvatarStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub gateway: Arc<SessionGateway>,
    pub drafts: Arc<DraftRegistry>,
    pub avatars: Arc<dyn AvatarStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting BioPage Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Avatar directory: {:?}", config.avatar_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool.clone()));

    // Auth provider and session gateway
    let mailer = Arc::new(LogMailer::new(config.public_url.clone()));
    let provider = SqliteAuthProvider::new(
        pool,
        mailer,
        chrono::Duration::hours(config.session_ttl_hours),
    );
    let gateway = Arc::new(SessionGateway::new(Arc::new(provider)));

    // Drafts die with their sessions
    let drafts = Arc::new(DraftRegistry::new());
    drafts.clone().watch(gateway.subscribe());

    let avatars = Arc::new(LocalAvatarStore::new(
        config.avatar_dir.clone(),
        config.public_url.clone(),
        config.max_avatar_bytes,
    ));

    // Create application state
    let state = AppState {
        repo,
        gateway,
        drafts,
        avatars,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (each handler reads its own bearer token where needed)
    let auth_routes = Router::new()
        .route("/sign-up", post(api::sign_up))
        .route("/confirm", post(api::confirm_sign_up))
        .route("/sign-in", post(api::sign_in))
        .route("/sign-out", post(api::sign_out))
        .route("/reset-password", post(api::request_password_reset))
        .route("/update-password", post(api::update_password))
        .route("/session", get(api::current_session));

    // Editing routes require a standard session
    let admin_routes = Router::new()
        .route(
            "/draft",
            post(api::open_draft)
                .get(api::get_draft)
                .patch(api::edit_draft)
                .delete(api::discard_draft),
        )
        .route("/draft/links", post(api::add_draft_link))
        .route("/draft/links/{id}", delete(api::remove_draft_link))
        .route("/draft/links/{id}/position", put(api::move_draft_link))
        .route("/draft/save", post(api::save_draft))
        .route(
            "/avatar",
            post(api::upload_avatar).layer(DefaultBodyLimit::max(state.config.max_avatar_bytes)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .route("/public/{username}", get(api::get_public_page));

    // Health check and public pages (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .nest_service("/avatars", ServeDir::new(&state.config.avatar_dir))
        .route("/{username}", get(api::get_public_page));

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
