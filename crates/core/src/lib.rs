//! Core profile photo logic for Connecto.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `storage` - Blob store over Apache OpenDAL (put / delete under generated names)
//! - `attachment` - Upload validation, the pointer repository seam, and the
//!   lifecycle service that sequences validate -> store -> swap -> reclaim

pub mod attachment;
pub mod storage;
