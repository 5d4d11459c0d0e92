//! Profile photo pointer column.
//!
//! The users table normally already exists (it belongs to the account
//! service); this migration only guarantees the columns the photo slot reads
//! and writes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PROFILE_PHOTO_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("ALTER TABLE users DROP COLUMN IF EXISTS profile_photo;")
            .await?;
        Ok(())
    }
}

const PROFILE_PHOTO_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid()
);

ALTER TABLE users ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT now();
ALTER TABLE users ADD COLUMN IF NOT EXISTS updated_at TIMESTAMPTZ NOT NULL DEFAULT now();

-- Stored blob name of the current photo; NULL means no photo
ALTER TABLE users ADD COLUMN IF NOT EXISTS profile_photo VARCHAR(255);
";
