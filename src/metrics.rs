//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Counter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Content Metrics
    pub static ref CONTENT_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("portfolio_content_writes_total", "Total number of content writes"),
        &["collection", "operation"]
    ).expect("metric can be created");
    pub static ref MESSAGES_RECEIVED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("portfolio_messages_received_total", "Contact messages received"),
        &["outcome"]
    ).expect("metric can be created");

    // Auth Metrics
    pub static ref LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("portfolio_logins_total", "Login attempts"),
        &["outcome"]
    ).expect("metric can be created");

    // Storage Metrics
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("portfolio_media_uploads_total", "Total number of media uploads"),
        &["backend", "outcome"]
    ).expect("metric can be created");
    pub static ref MEDIA_BYTES_UPLOADED: Counter = Counter::new(
        "portfolio_media_bytes_uploaded_total",
        "Total bytes of media uploaded"
    ).expect("metric can be created");

    // Application Metrics
    pub static ref STORAGE_AVAILABLE: IntGauge = IntGauge::new(
        "portfolio_storage_available",
        "1 when the persistence backend is configured, 0 otherwise"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("portfolio_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Call once at process start.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(CONTENT_WRITES_TOTAL.clone()))
        .expect("CONTENT_WRITES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MESSAGES_RECEIVED_TOTAL.clone()))
        .expect("MESSAGES_RECEIVED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(LOGINS_TOTAL.clone()))
        .expect("LOGINS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MEDIA_UPLOADS_TOTAL.clone()))
        .expect("MEDIA_UPLOADS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MEDIA_BYTES_UPLOADED.clone()))
        .expect("MEDIA_BYTES_UPLOADED can be registered");
    REGISTRY
        .register(Box::new(STORAGE_AVAILABLE.clone()))
        .expect("STORAGE_AVAILABLE can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Count a create/update/delete against a content collection.
pub fn record_content_write(collection: &str, operation: &str) {
    CONTENT_WRITES_TOTAL
        .with_label_values(&[collection, operation])
        .inc();
}
