//! Attachment types and data structures.

use bytes::Bytes;
use connecto_shared::UserId;
use serde::{Deserialize, Serialize};

/// Identifies one stored blob: its generated name and where it is served.
///
/// Immutable once created; a new upload always produces a new ref.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef {
    stored_name: String,
    public_location: String,
}

impl AttachmentRef {
    /// Create a ref from its parts.
    #[must_use]
    pub fn new(stored_name: impl Into<String>, public_location: impl Into<String>) -> Self {
        Self {
            stored_name: stored_name.into(),
            public_location: public_location.into(),
        }
    }

    /// Generated name of the blob inside the store's namespace.
    #[must_use]
    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    /// Stable locator string for the blob.
    #[must_use]
    pub fn public_location(&self) -> &str {
        &self.public_location
    }
}

/// Input for replacing a user's photo.
#[derive(Debug, Clone)]
pub struct ReplaceAttachmentInput {
    /// User whose slot is replaced.
    pub subject_id: UserId,
    /// Raw file bytes.
    pub bytes: Bytes,
    /// MIME type declared by the client.
    pub content_type: String,
    /// Filename as uploaded.
    pub filename: String,
}

impl ReplaceAttachmentInput {
    /// Create a new input.
    #[must_use]
    pub fn new(
        subject_id: UserId,
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            subject_id,
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_ref_accessors() {
        let blob = AttachmentRef::new("avatar_1.png", "http://host/avatars/avatar_1.png");
        assert_eq!(blob.stored_name(), "avatar_1.png");
        assert_eq!(blob.public_location(), "http://host/avatars/avatar_1.png");
    }

    #[test]
    fn test_input_size() {
        let input = ReplaceAttachmentInput::new(UserId::new(), vec![0u8; 12], "image/png", "a.png");
        assert_eq!(input.size(), 12);
    }
}
