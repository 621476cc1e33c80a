//! # Geocoding
//!
//! This crate provides a client for resolving free-text addresses to
//! coordinates and a formatted address via the Google Geocoding API.

/// HTTP client for the geocoding service.
pub mod client;

pub use client::{GeocodeError, GeocodedLocation, GeocoderClient};
