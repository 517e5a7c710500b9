//! # API Shared
//!
//! Shared utilities and definitions for the HPS APIs.
//!
//! Contains:
//! - REST request and response types (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Authentication utilities
//!
//! Used by `api-rest` and the `hps-run` binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::{HealthRes, HealthService};
