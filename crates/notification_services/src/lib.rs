//! # Notification Services
//!
//! This crate provides the mail sender for the application. Sends are
//! fire-and-forget at call sites: a failed send is logged, never surfaced
//! to the user.

/// Service definitions for sending mail.
pub mod service;
/// Types and structures used in notification services.
pub mod types;

pub use service::NotificationService;
pub use types::NotificationError;
