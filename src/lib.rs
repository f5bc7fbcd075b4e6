//! Portfolio - backend for a personal portfolio site
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Public reads and contact form                            │
//! │  - Token-protected content management                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Validation, partial updates                              │
//! │  - Image-list reconciliation                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                            │
//! │  - Media store: local directory or S3-compatible bucket     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and typed multipart forms
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `storage`: Upload policy and media backends
//! - `auth`: Bearer tokens and auth middleware
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod storage;

use std::sync::Arc;

use error::AppError;

/// Persistence: the database and the active media store
#[derive(Clone)]
pub struct Backend {
    pub db: Arc<data::Database>,
    pub relay: storage::UploadRelay,
}

/// Application state shared across all handlers
///
/// This struct is cloned for each request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// `None` when the configured storage backend is incomplete
    pub backend: Option<Backend>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the configured media store
    /// 2. Connect to SQLite database
    ///
    /// An S3 backend with missing credentials is not fatal: the server
    /// starts and persistence endpoints answer `StorageUnavailable`.
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, AppError> {
        tracing::info!("Initializing application state...");

        // 1. Media store
        let backend = match storage::build_media_store(&config.storage).await {
            Ok(store) => {
                tracing::info!(backend = store.backend(), "Media storage initialized");

                // 2. Database
                let db = data::Database::connect(&config.database.path).await?;
                Some(Backend {
                    db: Arc::new(db),
                    relay: storage::UploadRelay::new(store),
                })
            }
            Err(AppError::StorageUnavailable) => {
                tracing::warn!(
                    "storage.backend=s3 but endpoint, credentials or public URL are missing; \
                     persistence endpoints will respond with 500"
                );
                None
            }
            Err(error) => return Err(error),
        };

        metrics::STORAGE_AVAILABLE.set(i64::from(backend.is_some()));
        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }

    /// Persistence backend, or `StorageUnavailable`
    pub fn backend(&self) -> Result<&Backend, AppError> {
        self.backend.as_ref().ok_or(AppError::StorageUnavailable)
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    let mut router = Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::api_router(state.clone()))
        .merge(api::metrics_router());

    // Uploaded files are served by this process only for the local backend
    let storage = &state.config.storage;
    if storage.backend == config::StorageBackend::Local && state.backend.is_some() {
        router = router.nest_service(
            storage.local.url_prefix.trim_end_matches('/'),
            ServeDir::new(&storage.local.directory),
        );
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    let Some(allowed_origin) = server.allowed_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(allowed_origin.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
