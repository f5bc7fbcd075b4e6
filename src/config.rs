//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3002)
    pub port: u16,
    /// Single origin allowed by CORS. Permissive when unset.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Which media backend receives uploads
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub local: LocalStorageConfig,
    pub s3: S3StorageConfig,
}

/// Local filesystem storage
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageConfig {
    /// Directory uploaded files are written to
    pub directory: PathBuf,
    /// URL path the directory is served under (e.g. "/uploads")
    pub url_prefix: String,
}

/// S3-compatible object storage
///
/// Credentials are optional at load time. Missing credentials leave the
/// server running with persistence disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct S3StorageConfig {
    pub bucket: String,
    /// API endpoint (e.g. "https://<account>.r2.cloudflarestorage.com")
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Public URL base objects are reachable under
    /// e.g., "https://media.example.com"
    pub public_url: Option<String>,
    /// Key prefix for every uploaded object
    pub key_prefix: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret (32+ bytes)
    pub token_secret: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (PORTFOLIO__*)
    /// 5. `PORT` for the listening port
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let port_override = std::env::var("PORT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3002)?
            .set_default("database.path", "data/portfolio.db")?
            .set_default("storage.backend", "local")?
            .set_default("storage.local.directory", "uploads")?
            .set_default("storage.local.url_prefix", "/uploads")?
            .set_default("storage.s3.bucket", "uploads")?
            .set_default("storage.s3.region", "auto")?
            .set_default("storage.s3.key_prefix", "files")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (PORTFOLIO__*)
            .add_source(
                Environment::with_prefix("PORTFOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port_override)?
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        if self.auth.token_secret.len() < MIN_TOKEN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_TOKEN_SECRET_BYTES
            )));
        }

        let url_prefix = &self.storage.local.url_prefix;
        if !url_prefix.starts_with('/') || url_prefix.trim_end_matches('/').is_empty() {
            return Err(crate::error::AppError::Config(
                "storage.local.url_prefix must start with '/' and name a path".to_string(),
            ));
        }

        if let Some(origin) = &self.server.allowed_origin {
            url::Url::parse(origin).map_err(|e| {
                crate::error::AppError::Config(format!(
                    "server.allowed_origin is not a valid URL: {e}"
                ))
            })?;
        }

        Ok(())
    }
}

impl S3StorageConfig {
    /// Everything needed to talk to the bucket, or `None` when any
    /// piece is missing.
    pub fn credentials(&self) -> Option<S3Credentials<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
        }

        Some(S3Credentials {
            endpoint: present(&self.endpoint)?,
            access_key_id: present(&self.access_key_id)?,
            secret_access_key: present(&self.secret_access_key)?,
            public_url: present(&self.public_url)?,
        })
    }
}

/// Borrowed view of a complete S3 configuration
#[derive(Debug, Clone, Copy)]
pub struct S3Credentials<'a> {
    pub endpoint: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub public_url: &'a str,
}
