//! # Listing Services
//!
//! This crate provides campground listings and their comments: CRUD services,
//! search, cascade deletion, and the ownership check that restricts mutation
//! to a resource's owner or an administrator.

/// Campground listing operations.
pub mod campground_service;
/// Comment operations, nested under a campground.
pub mod comment_service;
/// The ownership check applied to every mutating request.
pub mod guard;
/// Types and structures used in listing services.
pub mod types;
