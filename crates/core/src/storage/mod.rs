//! Blob storage for profile photos using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem
//! - In-process memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("avatars/avatar_<token>.jpg", data)                     │
//! │ op.delete("avatars/avatar_<token>.jpg")   (missing is not error) │
//! │ op.stat / op.read                          (inspection)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every blob lives directly under one flat namespace and is named
//! `{prefix}{random token}{.ext}`. Names never derive from user input beyond a
//! sanitized, lower-cased extension, so a write can neither collide with nor
//! escape to another blob.

mod config;
mod error;
mod service;

pub use config::{BlobLocator, StorageConfig};
pub use connecto_shared::StorageProvider;
pub use error::StorageError;
pub use service::{BlobStore, StorageService};

pub(crate) use service::normalized_extension;
