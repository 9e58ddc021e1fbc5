//! Domus server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use domus_api::{middleware::AppState, router as api_router};
use domus_common::{Config, LocalStorage, StorageBackend};
use domus_core::{
    AnnouncementService, AttachmentService, CommentService, InfoService, NotificationService,
    PollService, PropertyService, TodoService, UserService,
};
use domus_db::repositories::{
    AnnouncementRepository, AttachmentRepository, CommentRepository, InfoRepository,
    NotificationRepository, PollRepository, ProfileRepository, PropertyRepository, TodoRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domus=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting domus server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = domus_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    domus_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let todo_repo = TodoRepository::new(Arc::clone(&db));
    let announcement_repo = AnnouncementRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let property_repo = PropertyRepository::new(Arc::clone(&db));
    let attachment_repo = AttachmentRepository::new(Arc::clone(&db));
    let info_repo = InfoRepository::new(Arc::clone(&db));

    // Initialize storage backend
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), profile_repo);
    let todo_service = TodoService::new(todo_repo.clone());
    let announcement_service = AnnouncementService::new(announcement_repo.clone());
    let poll_service = PollService::new(poll_repo);
    let notification_service = NotificationService::new(notification_repo, user_repo.clone());
    let comment_service = CommentService::new(comment_repo, announcement_repo, todo_repo);
    let property_service = PropertyService::new(property_repo, user_repo);
    let attachment_service = AttachmentService::new(attachment_repo, storage);
    let info_service = InfoService::new(info_repo);

    // Create app state
    let state = AppState {
        user_service,
        todo_service,
        announcement_service,
        poll_service,
        notification_service,
        comment_service,
        property_service,
        attachment_service,
        info_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            domus_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
