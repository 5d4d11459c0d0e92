//! Upload policy checks, run before anything reaches storage.

use connecto_shared::config::UploadSettings;

use super::error::ValidationError;
use crate::storage::normalized_extension;

/// Image subtypes / extensions accepted for profile photos.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

/// Size and type policy for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_file_size: u64,
}

impl UploadPolicy {
    /// Default max file size: 5 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

    /// Create a policy with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Build from the application settings.
    #[must_use]
    pub const fn from_settings(settings: &UploadSettings) -> Self {
        Self {
            max_file_size: settings.max_file_size,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub const fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Largest accepted payload in bytes.
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Check an upload. Size first, then type.
    ///
    /// Both the declared content type and the filename extension must name an
    /// accepted image type; either one alone is not enough.
    pub fn validate(
        &self,
        content_type: &str,
        filename: &str,
        size: u64,
    ) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_file_size,
            });
        }

        if !is_allowed_content_type(content_type) || !is_allowed_extension(filename) {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                filename: filename.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// `image/<subtype>` with an accepted subtype. Parameters are ignored.
fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence
        .split_once('/')
        .is_some_and(|(kind, subtype)| kind == "image" && ALLOWED_IMAGE_TYPES.contains(&subtype))
}

fn is_allowed_extension(filename: &str) -> bool {
    normalized_extension(filename).is_some_and(|ext| ALLOWED_IMAGE_TYPES.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MIB: u64 = 1024 * 1024;

    #[rstest]
    #[case("image/jpeg", "me.jpg")]
    #[case("image/jpeg", "me.jpeg")]
    #[case("image/png", "new.png")]
    #[case("image/webp", "pic.webp")]
    #[case("IMAGE/PNG", "SHOUTY.PNG")]
    #[case("image/jpeg; charset=binary", "me.JPG")]
    #[case("image/png", "renamed.jpg")]
    fn test_accepts_images(#[case] content_type: &str, #[case] filename: &str) {
        assert_eq!(UploadPolicy::new().validate(content_type, filename, 12 * 1024), Ok(()));
    }

    #[rstest]
    #[case("image/gif", "photo.gif")]
    #[case("text/plain", "photo.png")]
    #[case("application/octet-stream", "photo.jpg")]
    #[case("image/png", "photo.gif")]
    #[case("image/png", "photo")]
    #[case("image/svg+xml", "photo.svg")]
    #[case("png", "photo.png")]
    #[case("", "photo.png")]
    fn test_rejects_non_images(#[case] content_type: &str, #[case] filename: &str) {
        let err = UploadPolicy::new()
            .validate(content_type, filename, 1024)
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = UploadPolicy::new();
        assert!(policy.validate("image/png", "a.png", 5 * MIB).is_ok());
        assert_eq!(
            policy.validate("image/png", "a.png", 5 * MIB + 1),
            Err(ValidationError::TooLarge {
                size: 5 * MIB + 1,
                max: 5 * MIB
            })
        );
    }

    #[test]
    fn test_size_is_checked_before_type() {
        let err = UploadPolicy::new()
            .validate("image/gif", "photo.gif", 6 * MIB)
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = UploadSettings { max_file_size: 1024 };
        let policy = UploadPolicy::from_settings(&settings);
        assert_eq!(policy.max_file_size(), 1024);
        assert_eq!(UploadPolicy::default().max_file_size(), 5 * MIB);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Any size above the limit is TooLarge, any size at or below it passes
    // for a valid image.
    proptest! {
        #[test]
        fn prop_file_size_validation(
            max_size in 1024u64..10_000_000,
            file_size in 0u64..20_000_000,
        ) {
            let policy = UploadPolicy::new().with_max_file_size(max_size);
            let result = policy.validate("image/png", "photo.png", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok(), "Expected Ok for valid file size");
            } else {
                let is_too_large = matches!(result, Err(ValidationError::TooLarge { .. }));
                prop_assert!(is_too_large, "Expected TooLarge error");
            }
        }
    }

    // Only image/{jpeg,jpg,png,webp} passes the content type check.
    proptest! {
        #[test]
        fn prop_content_type_validation(content_type in "[a-z]+/[a-z0-9-]+") {
            let result = UploadPolicy::new().validate(&content_type, "photo.png", 1024);
            let allowed = content_type
                .strip_prefix("image/")
                .is_some_and(|sub| ALLOWED_IMAGE_TYPES.contains(&sub));

            if allowed {
                prop_assert!(result.is_ok(), "Expected Ok for allowed type");
            } else {
                let is_unsupported = matches!(result, Err(ValidationError::UnsupportedType { .. }));
                prop_assert!(is_unsupported, "Expected UnsupportedType error");
            }
        }
    }
}
