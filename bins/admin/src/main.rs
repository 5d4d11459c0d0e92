//! Operator CLI for profile photos.
//!
//! Usage:
//!   photo-admin show  <user-id>
//!   photo-admin set   <user-id> <file> <content-type>
//!   photo-admin clear <user-id>
//!
//! Runs the same lifecycle as the web service against the configured
//! database and blob store. Configuration comes from `config/` files and
//! `CONNECTO__*` environment variables (see `AppConfig::load`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use connecto_core::attachment::{AttachmentService, ReplaceAttachmentInput, UploadPolicy};
use connecto_core::storage::{StorageConfig, StorageService};
use connecto_db::{ProfilePhotoRepository, connect_with};
use connecto_shared::{AppConfig, UserId};

const USAGE: &str = "usage: photo-admin <show|set|clear> <user-id> [<file> <content-type>]";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Show(UserId),
    Set {
        user_id: UserId,
        file: PathBuf,
        content_type: String,
    },
    Clear(UserId),
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let [command, user_id, rest @ ..] = args else {
        bail!(USAGE);
    };
    let user_id: UserId = user_id
        .parse()
        .with_context(|| format!("invalid user id '{user_id}'"))?;

    match (command.as_str(), rest) {
        ("show", []) => Ok(Command::Show(user_id)),
        ("clear", []) => Ok(Command::Clear(user_id)),
        ("set", [file, content_type]) => Ok(Command::Set {
            user_id,
            file: PathBuf::from(file),
            content_type: content_type.clone(),
        }),
        _ => bail!(USAGE),
    }
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("'{}' has no usable file name", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connecto=debug,photo_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let store = StorageService::from_config(StorageConfig::from_settings(&config.storage))?;
    store.init().await?;
    info!(provider = store.provider_name(), "Blob store ready");

    let repo = ProfilePhotoRepository::new(db, store.locator().clone());
    let service = AttachmentService::new(
        Arc::new(store),
        Arc::new(repo),
        UploadPolicy::from_settings(&config.upload),
    );

    match command {
        Command::Show(user_id) => match service.current(user_id).await? {
            Some(photo) => println!("{}", photo.public_location()),
            None => println!("(no photo)"),
        },
        Command::Set {
            user_id,
            file,
            content_type,
        } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let input = ReplaceAttachmentInput::new(user_id, bytes, content_type, file_name(&file)?);
            let photo = service.replace(input).await?;
            println!("{}", photo.public_location());
        }
        Command::Clear(user_id) => {
            service.clear(user_id).await?;
            println!("Photo removed.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_show_and_clear() {
        let id = UserId::new();
        assert_eq!(
            parse_args(&args(&["show", &id.to_string()])).unwrap(),
            Command::Show(id)
        );
        assert_eq!(
            parse_args(&args(&["clear", &id.to_string()])).unwrap(),
            Command::Clear(id)
        );
    }

    #[test]
    fn test_parse_set() {
        let id = UserId::new();
        let parsed = parse_args(&args(&["set", &id.to_string(), "./me.jpg", "image/jpeg"])).unwrap();
        assert_eq!(
            parsed,
            Command::Set {
                user_id: id,
                file: PathBuf::from("./me.jpg"),
                content_type: "image/jpeg".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let id = UserId::new().to_string();
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["show"])).is_err());
        assert!(parse_args(&args(&["show", "u1"])).is_err());
        assert!(parse_args(&args(&["set", &id, "./me.jpg"])).is_err());
        assert!(parse_args(&args(&["delete", &id])).is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/me.JPG")).unwrap(), "me.JPG");
        assert!(file_name(Path::new("/")).is_err());
    }
}
