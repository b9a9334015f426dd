//! Bookstore Server
//!
//! REST API server for bookstore catalog and account administration.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookstore_server::{
    api,
    auth::SessionManager,
    config::AppConfig,
    cover::CoverStore,
    error,
    repository::{HealthStore, PgStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");
    error::set_expose_detail(config.logging.expose_errors);

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookstore_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookstore Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let store = PgStore::new(pool);
    store.ping().await.expect("Database ping failed");

    let auth = SessionManager::new(&config.auth).expect("Failed to create session manager");
    let covers = CoverStore::new(&config.covers)
        .await
        .expect("Failed to create cover store");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        auth: Arc::new(auth),
        covers: Arc::new(covers),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes: catalog reads, signup, login, health
    let public = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .route("/account", post(api::accounts::signup))
        .route("/account/sessions", post(api::accounts::login))
        .route("/genres", get(api::genres::list_genres))
        .route("/genres/:id", get(api::genres::get_genre))
        .route("/authors", get(api::authors::list_authors))
        .route("/authors/:id", get(api::authors::get_author))
        .route("/books", get(api::books::list_books))
        .route("/books/:isbn", get(api::books::get_book));

    // Routes requiring a valid session
    let authenticated = Router::new()
        .route("/account", get(api::accounts::me).put(api::accounts::update_me))
        .route("/account/password", put(api::accounts::change_password))
        .route("/account/sessions", delete(api::accounts::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Routes requiring an admin session
    let admin = Router::new()
        .route("/genres", post(api::genres::create_genre))
        .route(
            "/genres/:id",
            put(api::genres::update_genre).delete(api::genres::delete_genre),
        )
        .route("/authors", post(api::authors::create_author))
        .route(
            "/authors/:id",
            put(api::authors::update_author).delete(api::authors::delete_author),
        )
        .route(
            "/books/:isbn",
            post(api::books::create_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route(
            "/books/:isbn/cover",
            put(api::covers::upload_cover).delete(api::covers::delete_cover),
        )
        .route(
            "/users",
            get(api::accounts::list_users).post(api::accounts::create_user),
        )
        .route(
            "/users/:id",
            get(api::accounts::get_user)
                .put(api::accounts::update_user)
                .delete(api::accounts::delete_user),
        )
        .route("/users/:id/password", post(api::accounts::set_user_password))
        .route(
            "/users/:id/sessions",
            delete(api::accounts::delete_user_sessions),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let api_v1 = public.merge(authenticated).merge(admin);

    Router::new()
        .nest("/api/v1", api_v1)
        // covers are served from the root, matching the URLs the store hands out
        .route("/covers/:image", get(api::covers::serve_cover))
        .with_state(state)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Completes when SIGINT or SIGTERM is received
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
