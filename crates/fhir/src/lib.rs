//! FHIR-aligned wire support for on-disk patient records.
//!
//! This crate provides the **wire model** and **format/translation helpers** for the
//! `patient.yaml` file stored for every registered patient.
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR JSON/REST transport)
//! - strict serialisation/deserialisation
//! - translation between domain primitives and wire structs

pub mod patient;

pub use patient::Patient;
pub use patient::{Gender, NameUse, PatientData};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
