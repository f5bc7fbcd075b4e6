//! Media storage on S3-compatible object storage
//!
//! Works with Cloudflare R2, Supabase Storage, MinIO and anything else
//! that speaks the S3 API. Objects are served from `public_url`.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{MediaStore, build_s3_http_client, unique_object_name};
use crate::config::{S3Credentials, S3StorageConfig};
use crate::error::AppError;

/// Uploads media to a bucket and returns public URLs
pub struct S3MediaStore {
    client: S3Client,
    bucket: String,
    /// Public URL base, without trailing slash
    public_url: String,
    key_prefix: String,
}

impl S3MediaStore {
    /// Create new S3 client
    ///
    /// # Errors
    /// Returns error if the public URL is not a valid URL
    pub fn new(config: &S3StorageConfig, credentials: S3Credentials<'_>) -> Result<Self, AppError> {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

        url::Url::parse(credentials.public_url)
            .map_err(|e| AppError::Config(format!("storage.s3.public_url is invalid: {e}")))?;

        let provider = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            None,
            None,
            "portfolio-s3",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .http_client(build_s3_http_client())
            .region(Region::new(config.region.clone()))
            .endpoint_url(credentials.endpoint)
            .credentials_provider(provider)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_url: credentials.public_url.trim_end_matches('/').to_string(),
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
        })
    }

    fn object_key(&self, name: &str) -> String {
        if self.key_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key_prefix, name)
        }
    }

    /// Public URL for an object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn store(
        &self,
        data: Vec<u8>,
        original_file_name: &str,
        content_type: &str,
    ) -> Result<String, AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        let key = self.object_key(&unique_object_name(original_file_name));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control("public, max-age=31536000") // 1 year
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(format!("S3 upload failed: {e}")))?;

        Ok(self.public_url(&key))
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}
