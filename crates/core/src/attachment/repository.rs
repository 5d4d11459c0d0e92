//! Pointer repository: which ref is each user's current photo.

use std::future::Future;

use connecto_shared::UserId;
use dashmap::DashMap;

use super::error::AttachmentError;
use super::types::AttachmentRef;

/// Repository trait for the user -> current photo pointer.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PointerRepository: Send + Sync {
    /// Current ref of `subject_id`, `None` if the slot is empty.
    ///
    /// Fails with `SubjectNotFound` if the user does not exist.
    fn get(
        &self,
        subject_id: UserId,
    ) -> impl Future<Output = Result<Option<AttachmentRef>, AttachmentError>> + Send;

    /// Atomically store `new_ref` and return whatever was current before.
    ///
    /// Must be linearizable per user: two concurrent swaps on one user each
    /// observe a distinct previous value. Swaps on different users need not
    /// coordinate. Fails with `SubjectNotFound` if the user does not exist.
    fn swap(
        &self,
        subject_id: UserId,
        new_ref: Option<AttachmentRef>,
    ) -> impl Future<Output = Result<Option<AttachmentRef>, AttachmentError>> + Send;
}

/// Pointer table held in process memory.
///
/// Each swap runs under the entry's shard lock, so swaps on one user are
/// serialized while other users stay uncontended.
#[derive(Debug, Default)]
pub struct InMemoryPointerRepository {
    slots: DashMap<UserId, Option<AttachmentRef>>,
}

impl InMemoryPointerRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `subject_id` known with an empty slot. Existing slots are kept.
    pub fn register_subject(&self, subject_id: UserId) {
        self.slots.entry(subject_id).or_insert(None);
    }

    /// Forget `subject_id` entirely, as if the account were deleted.
    pub fn remove_subject(&self, subject_id: UserId) -> bool {
        self.slots.remove(&subject_id).is_some()
    }

    /// Number of known users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no users are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl PointerRepository for InMemoryPointerRepository {
    async fn get(&self, subject_id: UserId) -> Result<Option<AttachmentRef>, AttachmentError> {
        self.slots
            .get(&subject_id)
            .map(|slot| slot.value().clone())
            .ok_or_else(|| AttachmentError::subject_not_found(subject_id))
    }

    async fn swap(
        &self,
        subject_id: UserId,
        new_ref: Option<AttachmentRef>,
    ) -> Result<Option<AttachmentRef>, AttachmentError> {
        let mut slot = self
            .slots
            .get_mut(&subject_id)
            .ok_or_else(|| AttachmentError::subject_not_found(subject_id))?;
        Ok(std::mem::replace(slot.value_mut(), new_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str) -> AttachmentRef {
        AttachmentRef::new(name, format!("http://host/avatars/{name}"))
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() {
        let repo = InMemoryPointerRepository::new();
        let id = UserId::new();

        assert!(matches!(
            repo.get(id).await,
            Err(AttachmentError::SubjectNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            repo.swap(id, Some(blob("avatar_a.png"))).await,
            Err(AttachmentError::SubjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_new_subject_has_empty_slot() {
        let repo = InMemoryPointerRepository::new();
        let id = UserId::new();
        repo.register_subject(id);

        assert_eq!(repo.get(id).await.unwrap(), None);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_swap_returns_previous() {
        let repo = InMemoryPointerRepository::new();
        let id = UserId::new();
        repo.register_subject(id);

        assert_eq!(repo.swap(id, Some(blob("avatar_a.png"))).await.unwrap(), None);
        assert_eq!(
            repo.swap(id, Some(blob("avatar_b.png"))).await.unwrap(),
            Some(blob("avatar_a.png"))
        );
        assert_eq!(
            repo.swap(id, None).await.unwrap(),
            Some(blob("avatar_b.png"))
        );
        assert_eq!(repo.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_keeps_existing_slot() {
        let repo = InMemoryPointerRepository::new();
        let id = UserId::new();
        repo.register_subject(id);
        repo.swap(id, Some(blob("avatar_a.png"))).await.unwrap();

        repo.register_subject(id);
        assert_eq!(repo.get(id).await.unwrap(), Some(blob("avatar_a.png")));
    }

    #[tokio::test]
    async fn test_remove_subject() {
        let repo = InMemoryPointerRepository::new();
        let id = UserId::new();
        repo.register_subject(id);

        assert!(repo.remove_subject(id));
        assert!(!repo.remove_subject(id));
        assert!(repo.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_swaps_observe_distinct_previous_values() {
        let repo = std::sync::Arc::new(InMemoryPointerRepository::new());
        let id = UserId::new();
        repo.register_subject(id);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.swap(id, Some(blob(&format!("avatar_{i}.png"))))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut previous = Vec::new();
        for handle in handles {
            previous.push(handle.await.unwrap());
        }

        // Every value written except the last one is handed back exactly once.
        let returned: std::collections::HashSet<_> = previous.iter().flatten().cloned().collect();
        assert_eq!(returned.len(), 31);
        assert_eq!(previous.iter().filter(|p| p.is_none()).count(), 1);
        let current = repo.get(id).await.unwrap().unwrap();
        assert!(!returned.contains(&current));
    }
}
