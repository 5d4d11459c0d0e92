//! Attachment lifecycle service.

use std::sync::Arc;

use connecto_shared::UserId;
use tracing::{error, info, warn};

use super::error::AttachmentError;
use super::repository::PointerRepository;
use super::types::{AttachmentRef, ReplaceAttachmentInput};
use super::validation::UploadPolicy;
use crate::storage::BlobStore;

/// Sequences validate -> store -> swap -> reclaim for a user's photo slot.
///
/// Ordering is fixed: a new blob is fully written before the pointer swap is
/// attempted, and an old blob is deleted only after the swap has committed.
/// The pointer therefore never names a blob this service deleted.
///
/// Reclaim is best-effort. A failed delete is logged and leaves an orphan;
/// it never fails or undoes the surrounding call.
pub struct AttachmentService<S: BlobStore, R: PointerRepository> {
    store: Arc<S>,
    repo: Arc<R>,
    policy: UploadPolicy,
}

impl<S: BlobStore, R: PointerRepository> AttachmentService<S, R> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(store: Arc<S>, repo: Arc<R>, policy: UploadPolicy) -> Self {
        Self {
            store,
            repo,
            policy,
        }
    }

    /// Replace the user's photo with the uploaded file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The upload fails validation (nothing is stored)
    /// - The blob store cannot write (no pointer is touched)
    /// - The user does not exist or the pointer table fails (the new blob is
    ///   deleted again before the error is returned)
    /// - The pointer commit was not acknowledged (the new blob is kept, since
    ///   the pointer may already name it)
    pub async fn replace(
        &self,
        input: ReplaceAttachmentInput,
    ) -> Result<AttachmentRef, AttachmentError> {
        let size = input.size();
        let ReplaceAttachmentInput {
            subject_id,
            bytes,
            content_type,
            filename,
        } = input;

        self.policy.validate(&content_type, &filename, size)?;

        let blob = self.store.put(bytes, &filename).await?;

        let previous = match self.repo.swap(subject_id, Some(blob.clone())).await {
            Ok(previous) => previous,
            Err(e @ AttachmentError::CommitUncertain(_)) => {
                // The pointer may already name the blob; keep it.
                warn!(
                    subject_id = %subject_id,
                    stored_name = %blob.stored_name(),
                    error = %e,
                    "Pointer commit unconfirmed, keeping new profile photo"
                );
                return Err(e);
            }
            Err(e) => {
                self.discard(subject_id, &blob).await;
                return Err(e);
            }
        };

        info!(
            subject_id = %subject_id,
            stored_name = %blob.stored_name(),
            size,
            "Profile photo replaced"
        );

        if let Some(old) = previous {
            self.reclaim(subject_id, &old).await;
        }

        Ok(blob)
    }

    /// Remove the user's photo, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the pointer table fails.
    /// A failed reclaim of the old blob is not an error.
    pub async fn clear(&self, subject_id: UserId) -> Result<(), AttachmentError> {
        let previous = self.repo.swap(subject_id, None).await?;

        if let Some(old) = previous {
            info!(
                subject_id = %subject_id,
                stored_name = %old.stored_name(),
                "Profile photo cleared"
            );
            self.reclaim(subject_id, &old).await;
        }

        Ok(())
    }

    /// Current photo of the user, `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the pointer table fails.
    pub async fn current(
        &self,
        subject_id: UserId,
    ) -> Result<Option<AttachmentRef>, AttachmentError> {
        self.repo.get(subject_id).await
    }

    /// Delete a superseded blob after the swap committed.
    async fn reclaim(&self, subject_id: UserId, old: &AttachmentRef) {
        if !self.store.owns(old.stored_name()) {
            warn!(
                subject_id = %subject_id,
                previous = %old.public_location(),
                "Previous photo is not managed by this store, skipping reclaim"
            );
            return;
        }

        if let Err(e) = self.store.delete(old.stored_name()).await {
            warn!(
                subject_id = %subject_id,
                stored_name = %old.stored_name(),
                error = %e,
                "Could not delete old profile photo"
            );
        }
    }

    /// Delete a blob whose swap never committed.
    async fn discard(&self, subject_id: UserId, blob: &AttachmentRef) {
        if let Err(e) = self.store.delete(blob.stored_name()).await {
            error!(
                subject_id = %subject_id,
                stored_name = %blob.stored_name(),
                error = %e,
                "Could not delete uncommitted profile photo, blob is orphaned"
            );
        }
    }
}
