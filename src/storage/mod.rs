//! Object storage for compressed uploads
//! Uses Apache Arrow object_store crate

mod keys;

pub use keys::KeyGenerator;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, path::Path as StoragePath,
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub etag: Option<String>,
    pub size: usize,
}

/// Write side of the storage collaborator used by the batch pipeline.
///
/// Any error is batch-fatal under the fail-fast policy; nothing is retried.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key` with the given content type
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<UploadMetadata>;

    /// Public locator for a stored key
    fn object_url(&self, key: &str) -> String;
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
    public_base_url: String,
    // LocalFileSystem rejects object attributes
    content_types: bool,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String, public_base_url: String) -> Self {
        Self {
            store,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            content_types: true,
        }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        let config = StorageConfig::default();
        Self::new(
            Arc::new(object_store::memory::InMemory::new()),
            config.bucket.clone(),
            config.object_base_url(),
        )
    }

    /// Build the backend selected in configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match config.provider {
            StorageProvider::Memory => Arc::new(object_store::memory::InMemory::new()),
            StorageProvider::Local => {
                std::fs::create_dir_all(&config.root)?;
                Arc::new(object_store::local::LocalFileSystem::new_with_prefix(
                    &config.root,
                )?)
            }
            StorageProvider::S3 => {
                let mut builder = object_store::aws::AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);

                if let Some(endpoint) = &config.endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let Some(access_key) = &config.access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = &config.secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }

                Arc::new(builder.build()?)
            }
        };

        tracing::info!(
            provider = ?config.provider,
            bucket = %config.bucket,
            "Storage backend ready"
        );

        let mut client = Self::new(store, config.bucket.clone(), config.object_base_url());
        client.content_types = config.provider != StorageProvider::Local;
        Ok(client)
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = StoragePath::from(key);

        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("{key}: {e}")))?;

        let bytes = result.bytes().await?;

        tracing::debug!(key, size = bytes.len(), "Downloaded from storage");

        Ok(bytes.to_vec())
    }

    /// Content type recorded for a stored object, if any
    pub async fn content_type(&self, key: &str) -> Result<Option<String>> {
        let result = self.store.get(&StoragePath::from(key)).await?;
        Ok(result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string()))
    }
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<UploadMetadata> {
        let path = StoragePath::from(key);
        let size = body.len();

        let mut attributes = Attributes::new();
        if self.content_types {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let put_result = self
            .store
            .put_opts(&path, PutPayload::from(body), opts)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{key}: {e}")))?;

        tracing::info!(key = %path, size, content_type, "Uploaded to storage");

        Ok(UploadMetadata {
            key: path.to_string(),
            etag: put_result.e_tag,
            size,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
