use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::imaging::{CompressionSettings, OutputFormat, Quality, ResizeBounds};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub compression: CompressionDefaults,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound on the (decompressed) request body
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_payload_bytes() -> usize {
    32 * 1024 * 1024 // 32 MB
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Memory,
    Local,
    S3,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// S3-compatible endpoint override
    pub endpoint: Option<String>,
    /// Directory for the local provider
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Base of the URLs returned to callers; derived from bucket and region when unset
    pub public_base_url: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// S3 access key (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_key: Option<String>,
    /// S3 secret key (loaded from environment, not from config file)
    #[serde(skip)]
    pub secret_key: Option<String>,
}

impl StorageConfig {
    /// `https://{bucket}.s3.{region}.amazonaws.com` unless overridden
    pub fn object_base_url(&self) -> String {
        self.public_base_url.clone().unwrap_or_else(|| {
            format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Memory,
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            root: default_root(),
            public_base_url: None,
            key_prefix: default_key_prefix(),
            access_key: None,
            secret_key: None,
        }
    }
}

fn default_bucket() -> String {
    "imgbatch-media".to_string()
}

fn default_region() -> String {
    "ap-south-1".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("data/objects")
}

fn default_key_prefix() -> String {
    "uploads".to_string()
}

/// Compression applied when a file carries no (or a partial) `config`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompressionDefaults {
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_quality")]
    pub quality: u32,
    #[serde(default = "default_resize_enabled")]
    pub resize_enabled: bool,
    #[serde(default)]
    pub resize: ResizeBounds,
}

impl CompressionDefaults {
    pub fn settings(&self) -> CompressionSettings {
        CompressionSettings {
            format: self.format,
            quality: Quality::new(self.quality),
            resize: self.resize_enabled.then_some(self.resize),
        }
    }
}

impl Default for CompressionDefaults {
    fn default() -> Self {
        Self {
            format: default_format(),
            quality: default_quality(),
            resize_enabled: default_resize_enabled(),
            resize: ResizeBounds::default(),
        }
    }
}

fn default_format() -> OutputFormat {
    OutputFormat::Jpeg
}

fn default_quality() -> u32 {
    60
}

fn default_resize_enabled() -> bool {
    true
}

/// How one file's failure affects the rest of the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failure aborts the batch; nothing but the error is reported
    #[default]
    FailFast,
    /// Every file is attempted; failures are reported next to the uploads
    Isolate,
}

/// Batch orchestration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Files processed at the same time within one request
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}
