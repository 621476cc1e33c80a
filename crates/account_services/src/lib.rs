//! # Account Services
//!
//! This crate provides account management for the application.
//! It includes registration, credential verification, cookie sessions,
//! the password-reset flow, and request-identity middleware.

/// Middleware and extractors that bind the session identity to each request.
pub mod middleware;
/// Password-reset token issuance and consumption.
pub mod reset;
/// Service definitions for account creation and credential operations.
pub mod service;
/// Server-side session storage behind the session cookie.
pub mod session;
/// Types and structures used in account services.
pub mod types;
