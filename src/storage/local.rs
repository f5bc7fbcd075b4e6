//! Media storage on the local filesystem
//!
//! Files land in a directory that the router serves under
//! `storage.local.url_prefix`.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{MediaStore, unique_object_name};
use crate::config::LocalStorageConfig;
use crate::error::AppError;

/// Writes uploads into a local directory
pub struct LocalMediaStore {
    directory: PathBuf,
    url_prefix: String,
}

impl LocalMediaStore {
    /// Create the store, creating the upload directory if needed
    ///
    /// # Errors
    /// Returns error if the directory cannot be created
    pub async fn new(config: &LocalStorageConfig) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.directory)
            .await
            .map_err(|e| {
                AppError::Config(format!(
                    "cannot create upload directory {}: {e}",
                    config.directory.display()
                ))
            })?;

        Ok(Self {
            directory: config.directory.clone(),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Directory uploaded files are written to
    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(
        &self,
        data: Vec<u8>,
        original_file_name: &str,
        _content_type: &str,
    ) -> Result<String, AppError> {
        let name = unique_object_name(original_file_name);
        let path = self.directory.join(&name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::UploadFailed(format!("local write failed: {e}")))?;

        Ok(format!("{}/{}", self.url_prefix, name))
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
