//! # Media Storage
//!
//! This crate provides the image-host client: it stores uploaded listing
//! images in S3 and returns a public URL plus a public id that can be used
//! to delete the image later.

/// S3-backed image store.
pub mod store;

pub use store::{MediaError, MediaStore, StoredImage};
