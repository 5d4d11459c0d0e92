//! Database migration runner for Connecto.
//!
//! Usage:
//!   migrator up      - Add the profile photo column (and users table if missing)
//!   migrator down    - Drop the profile photo column
//!   migrator status  - Show migration status
//!
//! Reads `DATABASE_URL`, optionally from a `.env` file.

use connecto_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The sea-orm CLI installs its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
