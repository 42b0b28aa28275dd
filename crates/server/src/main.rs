//! Hydromed server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use fred::interfaces::ClientLike;
use hydromed_api::{middleware::AppState, router as api_router};
use hydromed_common::{
    Config, ImageStore, LocalImageStore, SessionStore, TokenService,
};
use hydromed_core::{RequestService, SymptomService, UserService};
use hydromed_db::repositories::{
    RequestRepository, RequestSymptomRepository, SymptomRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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

/// Pick the image storage backend from configuration.
fn build_image_store(config: &Config) -> Arc<dyn ImageStore> {
    #[cfg(feature = "s3")]
    if let Some(endpoint) = &config.storage.s3_endpoint {
        info!(endpoint = %endpoint, bucket = %config.storage.s3_bucket, "Using S3 image storage");
        return Arc::new(hydromed_common::storage::S3ImageStore::new(
            endpoint,
            config.storage.s3_bucket.clone(),
            &config.storage.s3_region,
            config.storage.s3_access_key.as_deref().unwrap_or_default(),
            config.storage.s3_secret_key.as_deref().unwrap_or_default(),
        ));
    }

    info!(path = %config.storage.base_path, "Using local image storage");
    Arc::new(LocalImageStore::new(
        config.storage.base_path.clone().into(),
        config.storage.base_url.clone(),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hydromed=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting hydromed server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = hydromed_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    hydromed_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect to Redis for sessions
    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let redis_client = fred::clients::Client::new(redis_config, None, None, None);
    redis_client.connect();
    redis_client.wait_for_connect().await?;
    let redis_client = Arc::new(redis_client);
    info!("Connected to Redis");

    let sessions = SessionStore::new(
        redis_client,
        &config.redis.prefix,
        config.auth.session_ttl_secs,
    );
    let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
    let images = build_image_store(&config);

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let symptom_repo = SymptomRepository::new(Arc::clone(&db));
    let request_repo = RequestRepository::new(Arc::clone(&db));
    let link_repo = RequestSymptomRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo, request_repo.clone());
    let symptom_service = SymptomService::new(symptom_repo.clone(), link_repo.clone(), images);
    let request_service = RequestService::new(request_repo, link_repo, symptom_repo);

    let state = AppState {
        user_service,
        symptom_service,
        request_service,
        sessions,
        tokens,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hydromed_api::middleware::auth_middleware,
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
