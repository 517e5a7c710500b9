//! Patient identifiers and sharded-path utilities.
//!
//! Every patient record is addressed by a [`PatientId`]: a UUID held in canonical form,
//! **32 lowercase hexadecimal characters** with no hyphens. The same value is used in REST
//! paths, in `patient.yaml`, and to derive the on-disk location of a record.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Externally supplied identifiers must already be canonical; uppercase or hyphenated input
//! is rejected rather than silently normalised.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, records live under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, which
//! keeps any one directory's fan-out small.

mod patient_id;

pub use patient_id::{PatientId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
