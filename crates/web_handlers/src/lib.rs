//! # Web Handlers for the Campstead Web Application
//!
//! This crate provides the web handlers for the Campstead application.

/// Authentication handlers (register, login, logout)
mod auth_handlers;
pub use auth_handlers::*;

/// Password-reset handlers (forgot, reset)
mod reset_handlers;
pub use reset_handlers::*;

/// Checkout and payment handlers
mod payment_handlers;
pub use payment_handlers::*;

/// Campground listing handlers
mod campground_handlers;
pub use campground_handlers::*;

/// Comment handlers, nested under a campground
mod comment_handlers;
pub use comment_handlers::*;

/// Public user-profile handlers
mod profile_handlers;
pub use profile_handlers::*;

/// Multipart form parsing for listing uploads
mod multipart;
pub use multipart::{CampgroundForm, ImageUpload};
