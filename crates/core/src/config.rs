//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Request handling never reads process-wide environment variables, which keeps behaviour
//! consistent across multi-threaded runtimes and test harnesses.

use crate::constants::{DEFAULT_PATIENT_DATA_DIR, PATIENTS_DIR_NAME};
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which patient store implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// One `patient.yaml` per patient under the patient data directory.
    File,
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(PatientError::InvalidInput(format!(
                "unknown patient store '{other}' (expected 'file' or 'memory')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    store_backend: StoreBackend,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if the file backend is selected with an empty
    /// patient data directory.
    pub fn new(patient_data_dir: PathBuf, store_backend: StoreBackend) -> PatientResult<Self> {
        if store_backend == StoreBackend::File && patient_data_dir.as_os_str().is_empty() {
            return Err(PatientError::InvalidInput(
                "patient_data_dir cannot be empty for the file store".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            store_backend,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }
}

/// Resolve the patient data directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PATIENT_DATA_DIR`].
pub fn patient_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_DIR))
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StoreBackend::File`].
pub fn store_backend_from_env_value(value: Option<String>) -> PatientResult<StoreBackend> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<StoreBackend>()).transpose()?;

    Ok(parsed.unwrap_or(StoreBackend::File))
}
