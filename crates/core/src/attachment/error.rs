//! Attachment error types.

use connecto_shared::{AppError, UserId};
use thiserror::Error;

use crate::storage::StorageError;

/// Upload rejected by the policy. Caller error, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// File too large.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    TooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Declared type or filename extension is not an accepted image type.
    #[error("only image files (JPG, PNG, WEBP) are allowed, got '{content_type}' for '{filename}'")]
    UnsupportedType {
        /// Declared MIME type.
        content_type: String,
        /// Uploaded filename.
        filename: String,
    },
}

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Upload failed validation; nothing was stored.
    #[error("invalid upload: {0}")]
    Validation(#[from] ValidationError),

    /// Blob store failed; no pointer was touched.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The user does not exist.
    #[error("user not found: {0}")]
    SubjectNotFound(UserId),

    /// Pointer table operation failed.
    #[error("repository error: {0}")]
    Repository(String),

    /// The pointer write was sent but its commit was not acknowledged, so it
    /// may or may not have been applied.
    #[error("pointer commit outcome unknown: {0}")]
    CommitUncertain(String),
}

impl AttachmentError {
    /// Create a subject not found error.
    #[must_use]
    pub fn subject_not_found(id: UserId) -> Self {
        Self::SubjectNotFound(id)
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create a commit-uncertain error.
    #[must_use]
    pub fn commit_uncertain(msg: impl Into<String>) -> Self {
        Self::CommitUncertain(msg.into())
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::Validation(e) => Self::Validation(e.to_string()),
            AttachmentError::SubjectNotFound(id) => Self::NotFound(format!("user {id}")),
            AttachmentError::Storage(e) => Self::ExternalService(e.to_string()),
            AttachmentError::Repository(msg) => Self::Database(msg),
            AttachmentError::CommitUncertain(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AttachmentError::from(ValidationError::TooLarge {
            size: 6 * 1024 * 1024,
            max: 5 * 1024 * 1024,
        });
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
        assert!(app.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_subject_not_found_maps_to_not_found() {
        let app: AppError = AttachmentError::subject_not_found(UserId::new()).into();
        assert_eq!(app.status_code(), 404);
        assert!(!app.is_retryable());
    }

    #[test]
    fn test_environment_failures_are_retryable() {
        let storage: AppError = AttachmentError::from(StorageError::operation("disk full")).into();
        assert_eq!(storage.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert!(storage.is_retryable());

        let repo: AppError = AttachmentError::repository("connection reset").into();
        assert_eq!(repo.error_code(), "DATABASE_ERROR");
        assert!(repo.is_retryable());
    }

    #[test]
    fn test_commit_uncertain_maps_to_internal() {
        let app: AppError = AttachmentError::commit_uncertain("connection closed").into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.error_code(), "INTERNAL_ERROR");
    }
}
