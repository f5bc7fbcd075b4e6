//! Media storage module
//!
//! Handles:
//! - Upload policy (allowed image types, per-file size limit)
//! - The `MediaStore` capability and its two backends (local disk, S3)
//! - `UploadRelay`, which the content services use to turn files into
//!   references

mod local;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;
use crate::metrics::{MEDIA_BYTES_UPLOADED, MEDIA_UPLOADS_TOTAL};

pub use local::LocalMediaStore;
pub use s3::S3MediaStore;

/// Largest accepted file (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];
const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// A file received from a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Filename as sent by the client
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Lowercased extension of a filename, if it has one
fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check that a file is one of the accepted image types
///
/// Both the filename extension and the declared MIME type must match.
pub fn check_image_type(file_name: &str, content_type: &str) -> Result<(), AppError> {
    let extension_ok = extension_of(file_name)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    let content_type = content_type.trim().to_ascii_lowercase();
    let mime_ok = ALLOWED_CONTENT_TYPES.contains(&content_type.as_str());

    if extension_ok && mime_ok {
        Ok(())
    } else {
        Err(AppError::UploadFailed(format!(
            "unsupported file type: {file_name} ({content_type})"
        )))
    }
}

/// Check a complete upload against the type and size policy
pub fn check_upload(upload: &Upload) -> Result<(), AppError> {
    check_image_type(&upload.file_name, &upload.content_type)?;
    if upload.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge {
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Unique object name: `<unix-millis>-<random>.<ext>`
///
/// Extension comes from the original filename, `jpg` when it has none.
pub fn unique_object_name(original_file_name: &str) -> String {
    let ext = extension_of(original_file_name)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{millis}-{suffix}.{ext}")
}

/// Somewhere uploaded files can be persisted
///
/// Implementations return a reference the frontend can resolve: a path
/// served by this process or an absolute public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist one file and return its reference
    async fn store(
        &self,
        data: Vec<u8>,
        original_file_name: &str,
        content_type: &str,
    ) -> Result<String, AppError>;

    /// Backend label for logs and metrics
    fn backend(&self) -> &'static str;
}

/// Front door to the active `MediaStore`
///
/// Enforces the upload policy and converts backend failures into
/// "keep the previous reference" for optional image slots.
#[derive(Clone)]
pub struct UploadRelay {
    store: Arc<dyn MediaStore>,
}

impl UploadRelay {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Validate and persist one upload
    ///
    /// # Errors
    /// `UploadFailed` / `PayloadTooLarge` on policy violations,
    /// `UploadFailed` when the backend write fails.
    pub async fn store(&self, upload: Upload) -> Result<String, AppError> {
        check_upload(&upload)?;

        let size = upload.data.len();
        let backend = self.store.backend();
        match self
            .store
            .store(upload.data, &upload.file_name, &upload.content_type)
            .await
        {
            Ok(reference) => {
                MEDIA_UPLOADS_TOTAL
                    .with_label_values(&[backend, "success"])
                    .inc();
                MEDIA_BYTES_UPLOADED.inc_by(size as f64);
                tracing::debug!(backend, size, %reference, "Stored upload");
                Ok(reference)
            }
            Err(error) => {
                MEDIA_UPLOADS_TOTAL
                    .with_label_values(&[backend, "failure"])
                    .inc();
                Err(error)
            }
        }
    }

    /// Persist an optional single-image slot
    ///
    /// Returns `None` when nothing was uploaded or the upload failed;
    /// callers keep whatever reference they already had.
    pub async fn store_optional(&self, slot: &str, upload: Option<Upload>) -> Option<String> {
        let upload = upload?;
        let file_name = upload.file_name.clone();
        match self.store(upload).await {
            Ok(reference) => Some(reference),
            Err(error) => {
                tracing::warn!(slot, %file_name, %error, "Upload failed; keeping previous image");
                None
            }
        }
    }

    /// Persist uploads for a repeated slot, in order
    ///
    /// Failed uploads are skipped. With a `limit`, stops once that many
    /// references were produced.
    pub async fn store_many(
        &self,
        slot: &str,
        uploads: Vec<Upload>,
        limit: Option<usize>,
    ) -> Vec<String> {
        let mut references = Vec::with_capacity(uploads.len());
        for upload in uploads {
            if limit.is_some_and(|limit| references.len() >= limit) {
                break;
            }
            let file_name = upload.file_name.clone();
            match self.store(upload).await {
                Ok(reference) => references.push(reference),
                Err(error) => {
                    tracing::warn!(slot, %file_name, %error, "Upload failed; skipping file");
                }
            }
        }
        references
    }
}

/// Build the configured media store
///
/// # Errors
/// `StorageUnavailable` when the S3 backend is selected but not fully
/// configured; other errors when the backend cannot be initialized.
pub async fn build_media_store(config: &StorageConfig) -> Result<Arc<dyn MediaStore>, AppError> {
    match config.backend {
        StorageBackend::Local => {
            let store = LocalMediaStore::new(&config.local).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let credentials = config
                .s3
                .credentials()
                .ok_or(AppError::StorageUnavailable)?;
            let store = S3MediaStore::new(&config.s3, credentials)?;
            Ok(Arc::new(store))
        }
    }
}

pub(crate) fn build_s3_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}
