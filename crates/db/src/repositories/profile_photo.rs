//! Profile photo pointer repository for database operations.
//!
//! Implements the core `PointerRepository` on `users.profile_photo` using SeaORM.

use chrono::Utc;
use connecto_core::attachment::{AttachmentError, AttachmentRef, PointerRepository};
use connecto_core::storage::BlobLocator;
use connecto_shared::UserId;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Select,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::users;

/// Profile photo repository implementation.
#[derive(Debug)]
pub struct ProfilePhotoRepository {
    db: DatabaseConnection,
    locator: BlobLocator,
}

impl ProfilePhotoRepository {
    /// Create a new repository. `locator` must match the blob store's.
    #[must_use]
    pub fn new(db: DatabaseConnection, locator: BlobLocator) -> Self {
        Self { db, locator }
    }

    fn to_ref(&self, value: Option<String>) -> Option<AttachmentRef> {
        value.map(|value| self.locator.locate(self.locator.stored_name_of(&value)))
    }
}

/// Row lookup that holds the row lock until the transaction ends.
pub(crate) fn find_for_update(subject_id: UserId) -> Select<users::Entity> {
    users::Entity::find_by_id(subject_id.into_inner()).lock_exclusive()
}

fn repository_error(err: DbErr) -> AttachmentError {
    AttachmentError::repository(err.to_string())
}

impl PointerRepository for ProfilePhotoRepository {
    async fn get(&self, subject_id: UserId) -> Result<Option<AttachmentRef>, AttachmentError> {
        let user = users::Entity::find_by_id(subject_id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?
            .ok_or_else(|| AttachmentError::subject_not_found(subject_id))?;

        Ok(self.to_ref(user.profile_photo))
    }

    async fn swap(
        &self,
        subject_id: UserId,
        new_ref: Option<AttachmentRef>,
    ) -> Result<Option<AttachmentRef>, AttachmentError> {
        let txn = self.db.begin().await.map_err(repository_error)?;

        // Rolled back on drop if we bail out before commit.
        let user = find_for_update(subject_id)
            .one(&txn)
            .await
            .map_err(repository_error)?
            .ok_or_else(|| AttachmentError::subject_not_found(subject_id))?;

        let new_name = new_ref.map(|r| r.stored_name().to_string());
        let now: DateTimeWithTimeZone = Utc::now().into();

        users::Entity::update_many()
            .col_expr(users::Column::ProfilePhoto, Expr::value(new_name.clone()))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(subject_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(repository_error)?;

        // The server may have applied the commit even if we saw an error.
        txn.commit()
            .await
            .map_err(|e| AttachmentError::commit_uncertain(e.to_string()))?;

        debug!(
            subject_id = %subject_id,
            previous = ?user.profile_photo,
            current = ?new_name,
            "Profile photo pointer swapped"
        );

        Ok(self.to_ref(user.profile_photo))
    }
}
