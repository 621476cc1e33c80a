//! # Payments
//!
//! This crate provides the payment-processor client for the one-time
//! registration fee: a single confirmed PaymentIntent exchange against the
//! Stripe REST API.

/// HTTP client for the payment processor.
pub mod client;

pub use client::{
    PaymentClient, PaymentConfirmation, PaymentError, REGISTRATION_FEE_CENTS,
};
