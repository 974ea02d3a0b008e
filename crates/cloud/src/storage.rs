//! Object storage for uploads and avatars.
//!
//! [`S3Storage`] talks to any S3-compatible endpoint (the managed backend's
//! storage API, MinIO, AWS) with path-style addressing.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Metadata for an object that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
    pub size: u64,
    pub content_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend rejected or failed the write.
    #[error("Object upload failed: {0}")]
    Upload(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for non-AWS backends.
    pub endpoint: Option<String>,
    /// Static credentials; the default provider chain is used when absent.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Prefix joined with the object key to form public URLs.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Env Var                     | Default                      |
    /// |-----------------------------|------------------------------|
    /// | `STORAGE_BUCKET`            | required                     |
    /// | `STORAGE_REGION`            | `us-east-1`                  |
    /// | `STORAGE_ENDPOINT`          | none (AWS)                   |
    /// | `STORAGE_ACCESS_KEY_ID`     | none (provider chain)        |
    /// | `STORAGE_SECRET_ACCESS_KEY` | none (provider chain)        |
    /// | `STORAGE_PUBLIC_BASE_URL`   | derived from endpoint/bucket |
    pub fn from_env() -> Self {
        let bucket = std::env::var("STORAGE_BUCKET").expect("STORAGE_BUCKET must be set");
        let region = std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into());
        let endpoint = non_empty_var("STORAGE_ENDPOINT");
        let public_base_url = non_empty_var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|| default_public_base_url(&bucket, &region, endpoint.as_deref()));

        Self {
            bucket,
            region,
            endpoint,
            access_key_id: non_empty_var("STORAGE_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("STORAGE_SECRET_ACCESS_KEY"),
            public_base_url,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_public_base_url(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
    }
}

/// Join a base URL and an object key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Build a client from configuration. Static credentials win over the
    /// ambient provider chain.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()));

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "adstudio-env",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len() as u64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, size, "Stored object");

        Ok(StoredObject {
            key: key.to_string(),
            public_url: public_url(&self.public_base_url, key),
            size,
            content_type: content_type.to_string(),
        })
    }
}
