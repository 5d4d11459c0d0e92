//! Profile photo lifecycle.
//!
//! This module provides the business logic for the single-photo-per-user slot:
//! - Upload validation (size and image type policy)
//! - The pointer repository seam (user -> current photo ref)
//! - The lifecycle service that replaces or clears a user's photo and
//!   reclaims superseded blobs
//!
//! Per user the slot is either empty or bound to exactly one ref:
//!
//! ```text
//! Empty    --replace--> Bound(new)
//! Bound(a) --replace--> Bound(new)   (a reclaimed afterwards)
//! Bound(a) --clear----> Empty        (a reclaimed afterwards)
//! Empty    --clear----> Empty        (nothing to reclaim)
//! ```

mod error;
mod repository;
mod service;
mod types;
mod validation;


pub use error::{AttachmentError, ValidationError};
pub use repository::{InMemoryPointerRepository, PointerRepository};
pub use service::AttachmentService;
pub use types::{AttachmentRef, ReplaceAttachmentInput};
pub use validation::{ALLOWED_IMAGE_TYPES, UploadPolicy};
