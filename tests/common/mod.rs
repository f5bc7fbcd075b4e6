//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use portfolio::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ADMIN_USERNAME: &str = "owner";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const TOKEN_SECRET: &str = "test-secret-key-that-is-32-bytes-long!!";

static METRICS: Once = Once::new();

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub uploads_dir: PathBuf,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Configuration pointing every path into `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            allowed_origin: None,
        },
        database: config::DatabaseConfig {
            path: temp_dir.path().join("test.db"),
        },
        storage: config::StorageConfig {
            backend: config::StorageBackend::Local,
            local: config::LocalStorageConfig {
                directory: temp_dir.path().join("uploads"),
                url_prefix: "/uploads".to_string(),
            },
            s3: config::S3StorageConfig {
                bucket: "uploads".to_string(),
                endpoint: None,
                region: "auto".to_string(),
                access_key_id: None,
                secret_access_key: None,
                public_url: None,
                key_prefix: "files".to_string(),
            },
        },
        auth: config::AuthConfig {
            token_secret: TOKEN_SECRET.to_string(),
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server with local storage
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server after adjusting the default test config
    pub async fn with_config(adjust: impl FnOnce(&mut config::AppConfig)) -> Self {
        METRICS.call_once(portfolio::metrics::init_metrics);

        // Create temporary directory for database and uploads
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        adjust(&mut config);
        let uploads_dir = config.storage.local.directory.clone();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = portfolio::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            uploads_dir,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create the admin account directly through the service layer
    pub async fn create_admin(&self) {
        let backend = self.state.backend().unwrap();
        portfolio::service::AccountService::new(backend.db.clone())
            .create_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .unwrap();
    }

    /// Create the admin account and log in through the API
    pub async fn login(&self) -> String {
        self.create_admin().await;

        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

/// Multipart file part with an image content type
pub fn image_part(file_name: &str, mime: &str, data: &[u8]) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}
