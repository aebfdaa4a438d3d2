//! Instant8 backend: the API behind the Instant8 marketing site.
//!
//! Serves deployment management (create from a prompt, deploy, stop,
//! delete), cloud provider connections, per-user settings, a dashboard
//! summary, and the published pricing tiers. Accounts are optional: every
//! resource endpoint defaults to a seeded demo user so the site works
//! without logging in, while `/auth/register` and `/auth/login` issue JWT
//! sessions for real accounts.
//!
//! Storage is PostgreSQL when configured and reachable, with automatic
//! fallback to an in-memory store so the site never hard-fails on a missing
//! database. Provisioning is simulated by [`lifecycle::LifecycleScheduler`].
//!
//! # Example
//!
//! ```no_run
//! use instant8::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config {
//!         secret_key: Some("change-me".to_string()),
//!         ..Config::default()
//!     };
//!
//!     let app = Application::new(config).await?;
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod lifecycle;
pub mod openapi;
pub mod telemetry;
pub mod test_utils;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Json, Router,
};
use bon::Builder;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, warn, Level};
use utoipa::OpenApi as _;
use utoipa_scalar::{Scalar, Servable};

pub use crate::config::Config;

use crate::config::{CorsOrigin, DatabaseConfig};
use crate::db::models::users::UserCreate;
use crate::db::store::{MemoryStorage, PostgresStorage, Storage};
use crate::lifecycle::LifecycleScheduler;
use crate::openapi::ApiDoc;
use crate::types::DEMO_USER_ID;

/// Embedded database migrations, applied automatically at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Shared state for all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Config,
    pub lifecycle: Arc<LifecycleScheduler>,
}

/// Seed the demo account and its default provider connections and settings.
/// Idempotent; runs on every startup.
pub async fn seed_defaults(storage: &dyn Storage) -> Result<(), errors::Error> {
    if storage.user_by_id(DEMO_USER_ID).await?.is_none() {
        storage
            .create_user(&UserCreate {
                id: Some(DEMO_USER_ID),
                email: "demo@instant8.dev".to_string(),
                username: "demo".to_string(),
                password_hash: None,
            })
            .await?;
        info!("Created demo user");
    }
    storage.ensure_user_defaults(DEMO_USER_ID).await?;
    Ok(())
}

/// Connect to the configured storage backend.
///
/// An external database is probed with a bounded number of retries; if it
/// stays unreachable the server comes up on in-memory storage instead of
/// failing, since the site must keep working without a database.
#[instrument(skip_all)]
pub async fn setup_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    let DatabaseConfig::External { url, pool } = &config.database else {
        info!("Using in-memory storage");
        return Ok(Arc::new(MemoryStorage::new()));
    };

    let options = PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(pool.idle_timeout_secs));

    let mut attempt = 0;
    let pg_pool = loop {
        attempt += 1;
        match options.clone().connect(url).await {
            Ok(pg_pool) => break Some(pg_pool),
            Err(e) if attempt < pool.connect_retries => {
                warn!(
                    "Database connection attempt {}/{} failed: {e}",
                    attempt, pool.connect_retries
                );
                tokio::time::sleep(Duration::from_secs(pool.connect_retry_backoff_secs)).await;
            }
            Err(e) => {
                warn!(
                    "Database unreachable after {} attempt(s), falling back to in-memory storage: {e}",
                    pool.connect_retries
                );
                break None;
            }
        }
    };

    match pg_pool {
        Some(pg_pool) => {
            MIGRATOR.run(&pg_pool).await?;
            info!("Connected to PostgreSQL, migrations applied");
            Ok(Arc::new(PostgresStorage::new(pg_pool)))
        }
        None => Ok(Arc::new(MemoryStorage::new())),
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Liveness check used by deploy tooling and the frontend
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Instant8 API is running" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/health", get(health))
        // Accounts
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/user/profile", get(api::handlers::users::get_profile))
        // Deployments
        .route(
            "/deployments",
            get(api::handlers::deployments::list_deployments).post(api::handlers::deployments::create_deployment),
        )
        .route(
            "/deployments/{id}",
            get(api::handlers::deployments::get_deployment)
                .put(api::handlers::deployments::update_deployment)
                .delete(api::handlers::deployments::delete_deployment),
        )
        .route("/deployments/{id}/deploy", post(api::handlers::deployments::deploy_deployment))
        .route("/deployments/{id}/stop", post(api::handlers::deployments::stop_deployment))
        // Cloud providers
        .route("/cloud-providers", get(api::handlers::cloud_providers::list_cloud_providers))
        .route("/cloud-providers/{id}", put(api::handlers::cloud_providers::update_credentials))
        // Settings, dashboard, pricing
        .route(
            "/user-settings",
            get(api::handlers::user_settings::get_user_settings).put(api::handlers::user_settings::update_user_settings),
        )
        .route("/dashboard/stats", get(api::handlers::dashboard::get_dashboard_stats))
        .route("/pricing/tiers", get(api::handlers::pricing::list_pricing_tiers))
        // API documentation
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The assembled server: storage, scheduler, and router.
///
/// [`Application::new`] initializes all resources;
/// [`Application::serve`] runs the HTTP server until the provided shutdown
/// future completes, then cancels outstanding lifecycle timers.
pub struct Application {
    router: Router,
    config: Config,
    shutdown_token: tokio_util::sync::CancellationToken,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting instant8 with configuration: {:#?}", config);

        let storage = setup_storage(&config).await?;
        seed_defaults(storage.as_ref()).await?;

        // Shutdown token coordinates cancellation of pending lifecycle timers
        let shutdown_token = tokio_util::sync::CancellationToken::new();

        let lifecycle = Arc::new(LifecycleScheduler::new(
            storage.clone(),
            config.deployments.provisioning_delay,
            shutdown_token.clone(),
        ));
        // Re-arm transitions stranded by a previous process
        lifecycle.recover().await?;

        let state = AppState::builder()
            .storage(storage)
            .config(config.clone())
            .lifecycle(lifecycle)
            .build();

        let router = build_router(state)?;

        Ok(Self {
            router,
            config,
            shutdown_token,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Instant8 API listening on http://{}, docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Cancel any pending lifecycle timers
        info!("Shutting down...");
        self.shutdown_token.cancel();

        Ok(())
    }
}
