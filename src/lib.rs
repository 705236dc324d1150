//! PayTrust Payment Gateway Library
//!
//! Provides the idempotent payment pipeline, processor strategy layer, and
//! bank client resilience wrapper that make up the payment gateway front-end.

pub mod bank;
pub mod config;
pub mod core;
pub mod middleware;
pub mod payments;
pub mod processors;

pub use payments::PaymentService;
