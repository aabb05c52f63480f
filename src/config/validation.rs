use super::models::{Config, StorageProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("compression.quality must be at most 100, got {0}")]
    InvalidQuality(u32),

    #[error("compression.resize must be positive, got {width}x{height}")]
    InvalidResizeBounds { width: u32, height: u32 },

    #[error("batch.concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("server.max_payload_bytes must be positive")]
    InvalidPayloadLimit,

    #[error("storage.bucket must not be empty")]
    EmptyBucket,

    #[error("Storage provider is S3 but missing credentials (access_key or secret_key)")]
    MissingS3Credentials,

    #[error("storage.public_base_url must be an http(s) URL, got '{0}'")]
    InvalidPublicBaseUrl(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_compression(config)?;
    validate_batch(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_payload_bytes == 0 {
        return Err(ValidationError::InvalidPayloadLimit);
    }
    Ok(())
}

fn validate_compression(config: &Config) -> Result<(), ValidationError> {
    let compression = &config.compression;

    if compression.quality > 100 {
        return Err(ValidationError::InvalidQuality(compression.quality));
    }

    let resize = compression.resize;
    if compression.resize_enabled && (resize.width == 0 || resize.height == 0) {
        return Err(ValidationError::InvalidResizeBounds {
            width: resize.width,
            height: resize.height,
        });
    }

    Ok(())
}

fn validate_batch(config: &Config) -> Result<(), ValidationError> {
    if config.batch.concurrency == 0 {
        return Err(ValidationError::InvalidConcurrency);
    }
    Ok(())
}

/// Bucket, credentials for S3, and the public URL base
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    let storage = &config.storage;

    if storage.bucket.trim().is_empty() {
        return Err(ValidationError::EmptyBucket);
    }

    if storage.provider == StorageProvider::S3
        && (storage.access_key.is_none() || storage.secret_key.is_none())
    {
        return Err(ValidationError::MissingS3Credentials);
    }

    if let Some(url) = &storage.public_base_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidPublicBaseUrl(url.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ResizeBounds;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_quality_out_of_range() {
        let mut config = Config::default();
        config.compression.quality = 101;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidQuality(101))
        ));
    }

    #[test]
    fn test_zero_resize_bounds() {
        let mut config = Config::default();
        config.compression.resize = ResizeBounds::new(0, 100);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidResizeBounds { .. })
        ));

        // ignored while resizing is off
        config.compression.resize_enabled = false;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = Config::default();
        config.batch.concurrency = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidConcurrency)
        ));
    }

    #[test]
    fn test_s3_credentials_missing() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::S3;
        config.storage.access_key = Some("key".to_string());

        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingS3Credentials)
        ));
    }

    #[test]
    fn test_public_base_url_scheme() {
        let mut config = Config::default();
        config.storage.public_base_url = Some("ftp://cdn".to_string());

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidPublicBaseUrl(_))
        ));
    }

    #[test]
    fn test_empty_bucket() {
        let mut config = Config::default();
        config.storage.bucket = "  ".to_string();

        assert!(matches!(validate(&config), Err(ValidationError::EmptyBucket)));
    }
}
