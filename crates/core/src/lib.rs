//! # HPS Core
//!
//! Core business logic for the hospital patient service.
//!
//! This crate contains pure data operations and storage:
//! - Patient registration with MRN allocation, update, status changes and paged, filtered
//!   listing
//! - Duplicate candidate detection (phone, Soundex and exact-name rules)
//! - Patient stores: sharded FHIR YAML on disk, or in memory
//!
//! **No API concerns**: authentication, HTTP servers and DTOs belong in `api-rest` or
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod duplicates;
pub mod error;
pub mod patient;
pub mod record;
pub mod repositories;
pub mod search_index;

pub use config::{
    patient_data_dir_from_env_value, store_backend_from_env_value, CoreConfig, StoreBackend,
};
pub use duplicates::{DuplicateCandidate, MatchConfidence, MatchRule};
pub use error::{PatientError, PatientResult};
pub use patient::{PageRequest, PatientFilter, PatientPage, PatientService, Registration};
pub use record::{
    Address, EmergencyContact, Gender, MedicalInfo, Mrn, PatientDetails, PatientRecord,
    PatientStatus,
};
pub use repositories::{open_store, FilePatientStore, InMemoryPatientStore, PatientStore};
pub use search_index::{soundex, SoundexCode};

pub use hps_types::{EmailAddress, NonEmptyText, PhoneNumber, TextError};
pub use hps_uuid::PatientId;
