//! Blob store implementation using Apache OpenDAL.

use std::future::Future;
use std::path::Path;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;
use uuid::Uuid;

use super::config::{BlobLocator, StorageConfig};
use super::error::StorageError;
use crate::attachment::AttachmentRef;
use connecto_shared::StorageProvider;

/// Durable blob storage under generated names.
///
/// Implemented by [`StorageService`]; the lifecycle service only talks to this
/// trait and never touches the namespace directly.
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under a freshly generated name and return its ref.
    ///
    /// The name is `{prefix}{token}{.ext}` where `.ext` is the lower-cased
    /// extension of `original_filename`. A name is never reused.
    fn put(
        &self,
        bytes: Bytes,
        original_filename: &str,
    ) -> impl Future<Output = Result<AttachmentRef, StorageError>> + Send;

    /// Remove the named blob. Removing a missing blob succeeds.
    fn delete(&self, stored_name: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Whether `stored_name` is a name this store could have generated.
    fn owns(&self, stored_name: &str) -> bool;
}

/// OpenDAL-backed blob store.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
    locator: BlobLocator,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        let locator = config.locator();
        Ok(Self {
            operator,
            config,
            locator,
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator)
    }

    /// Make sure the namespace exists. Safe to call more than once.
    ///
    /// Flat object stores without directories report `Unsupported`, which is
    /// fine: their namespace is just a key prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be created.
    pub async fn init(&self) -> Result<(), StorageError> {
        let dir = format!("{}/", self.config.namespace);
        match self.operator.create_dir(&dir).await {
            Ok(()) => {
                debug!(namespace = %self.config.namespace, "Blob namespace ready");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::Unsupported => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Generate a fresh blob name for an upload called `original_filename`.
    #[must_use]
    pub fn generate_name(&self, original_filename: &str) -> String {
        let extension = normalized_extension(original_filename)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        format!(
            "{}{}{}",
            self.config.name_prefix,
            Uuid::new_v4().simple(),
            extension
        )
    }

    /// Read a blob's bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the blob does not exist.
    pub async fn read(&self, stored_name: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(stored_name)?;
        let buffer = self.operator.read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(stored_name)
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(buffer.to_bytes())
    }

    /// Check if a blob exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub async fn exists(&self, stored_name: &str) -> Result<bool, StorageError> {
        let path = self.object_path(stored_name)?;
        match self.operator.stat(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the locator used to build refs.
    #[must_use]
    pub fn locator(&self) -> &BlobLocator {
        &self.locator
    }

    fn object_path(&self, stored_name: &str) -> Result<String, StorageError> {
        if !self.owns(stored_name) {
            return Err(StorageError::invalid_key(stored_name));
        }
        Ok(format!("{}/{}", self.config.namespace, stored_name))
    }
}

impl BlobStore for StorageService {
    async fn put(&self, bytes: Bytes, original_filename: &str) -> Result<AttachmentRef, StorageError> {
        let stored_name = self.generate_name(original_filename);
        let path = self.object_path(&stored_name)?;
        let size = bytes.len();

        self.operator.write(&path, bytes).await?;

        debug!(stored_name = %stored_name, size, "Blob written");
        Ok(self.locator.locate(stored_name))
    }

    async fn delete(&self, stored_name: &str) -> Result<(), StorageError> {
        let path = self.object_path(stored_name)?;
        self.operator.delete(&path).await?;

        debug!(stored_name = %stored_name, "Blob deleted");
        Ok(())
    }

    fn owns(&self, stored_name: &str) -> bool {
        stored_name
            .strip_prefix(self.config.name_prefix.as_str())
            .is_some_and(|rest| {
                !rest.is_empty() && !rest.contains(['/', '\\']) && !rest.contains("..")
            })
    }
}

/// Lower-cased extension of `filename`, if it has a plain alphanumeric one.
pub(crate) fn normalized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
