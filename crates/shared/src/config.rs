//! Application configuration management.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    pub storage: StorageSettings,
    /// Upload policy configuration.
    #[serde(default)]
    pub upload: UploadSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Storage provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests and throwaway dev setups)
    Memory,
}

impl StorageProvider {
    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Where blobs live.
    pub provider: StorageProvider,
    /// Flat namespace (directory or key prefix) holding every blob.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Fixed prefix of generated blob names.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    /// Base URL under which the namespace is publicly served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_namespace() -> String {
    "avatars".to_string()
}

fn default_name_prefix() -> String {
    "avatar_".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:5001/uploads/avatars".to_string()
}

impl StorageSettings {
    /// Settings for `provider` with every other field at its default.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            namespace: default_namespace(),
            name_prefix: default_name_prefix(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Upload policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024 // 5 MiB
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CONNECTO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
