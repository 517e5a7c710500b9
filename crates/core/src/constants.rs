//! Constants used throughout the core crate.
//!
//! Path, filename and limit constants live here so storage and validation agree.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name (under the patient data directory) for patient records.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Filename for the FHIR-aligned patient resource.
pub const PATIENT_YAML_FILENAME: &str = "patient.yaml";

/// Maximum number of characters accepted for a first or last name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a street address line, emergency contact name or free-text medical note.
pub const MAX_TEXT_LEN: usize = 255;

/// Maximum length of a city, state or emergency contact relationship.
pub const MAX_LOCALITY_LEN: usize = 100;

/// Maximum length of a postal code.
pub const MAX_POSTAL_CODE_LEN: usize = 20;

/// Maximum length of a blood group (e.g. `AB-`).
pub const MAX_BLOOD_GROUP_LEN: usize = 10;

/// Rows per page when a listing does not ask for a size.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page a listing may return; larger requests are clamped.
pub const MAX_PAGE_SIZE: usize = 100;
