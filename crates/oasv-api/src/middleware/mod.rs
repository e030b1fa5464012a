//! # Middleware Modules
//!
//! Axum middleware for contract enforcement.

pub mod contract;
pub mod metrics;
