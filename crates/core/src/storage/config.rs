//! Storage configuration types.

use connecto_shared::StorageProvider;
use connecto_shared::config::StorageSettings;

use crate::attachment::AttachmentRef;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Flat namespace holding every blob (directory or key prefix).
    pub namespace: String,
    /// Fixed prefix of generated blob names.
    pub name_prefix: String,
    /// Base URL the namespace is served from.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self::from_settings(&StorageSettings::new(provider))
    }

    /// Build from the application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            namespace: settings.namespace.trim_matches('/').to_string(),
            name_prefix: settings.name_prefix.clone(),
            public_base_url: settings.public_base_url.clone(),
        }
    }

    /// Locator that turns stored names into refs for this configuration.
    #[must_use]
    pub fn locator(&self) -> BlobLocator {
        BlobLocator::new(&self.public_base_url)
    }
}

/// Maps stored blob names to their public location.
///
/// Shared by the blob store (when it mints a ref) and by pointer repositories
/// (when they rebuild a ref from a persisted name), so both always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocator {
    base_url: String,
}

impl BlobLocator {
    /// Create a locator rooted at `base_url`. Trailing slashes are dropped.
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// The public location of `stored_name`.
    #[must_use]
    pub fn public_location(&self, stored_name: &str) -> String {
        format!("{}/{}", self.base_url, stored_name)
    }

    /// Stored name behind a persisted pointer value.
    ///
    /// Older rows hold the full public location instead of the bare name;
    /// those are stripped back to the name. Anything else is returned as is.
    #[must_use]
    pub fn stored_name_of<'a>(&self, value: &'a str) -> &'a str {
        value
            .strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty())
            .unwrap_or(value)
    }

    /// Build the full ref for `stored_name`.
    #[must_use]
    pub fn locate(&self, stored_name: impl Into<String>) -> AttachmentRef {
        let stored_name = stored_name.into();
        let public_location = self.public_location(&stored_name);
        AttachmentRef::new(stored_name, public_location)
    }
}
