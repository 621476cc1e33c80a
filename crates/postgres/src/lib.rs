//! # Postgres
//!
//! This crate provides a client for the Campstead application to interact with a PostgreSQL database.

/// Database client for the Campstead application.
pub mod database;
