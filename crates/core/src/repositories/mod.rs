//! Patient record storage.
//!
//! [`PatientStore`] is the seam between the patient service and wherever records live.
//! Two implementations are provided:
//!
//! - [`file::FilePatientStore`]: one FHIR-aligned `patient.yaml` per patient in a sharded
//!   directory tree
//! - [`memory::InMemoryPatientStore`]: a process-local map for development and tests
//!
//! Stores hold no business rules beyond id uniqueness; validation and matching belong to the
//! service.

pub mod file;
pub mod memory;

use crate::config::{CoreConfig, StoreBackend};
use crate::record::PatientRecord;
use crate::PatientResult;
use hps_uuid::PatientId;
use std::sync::Arc;

pub use file::FilePatientStore;
pub use memory::InMemoryPatientStore;

/// Storage operations required by the patient service.
pub trait PatientStore: Send + Sync {
    /// Fetch one record, or `None` if no patient has this id.
    fn get(&self, id: &PatientId) -> PatientResult<Option<PatientRecord>>;

    /// Every stored record, active or not. Order is unspecified.
    fn list(&self) -> PatientResult<Vec<PatientRecord>>;

    /// Every active record except the one with `id`: the duplicate candidate pool.
    fn list_active_excluding(&self, id: &PatientId) -> PatientResult<Vec<PatientRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.is_active() && &p.id != id)
            .collect())
    }

    /// Store a new record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PatientError::AlreadyExists`] if the id is taken.
    fn insert(&self, record: &PatientRecord) -> PatientResult<()>;

    /// Replace an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PatientError::NotFound`] if no record has this id.
    fn update(&self, record: &PatientRecord) -> PatientResult<()>;
}

/// Build the store selected by `cfg`.
///
/// # Errors
///
/// Returns a `PatientError` if the file store's directory cannot be created.
pub fn open_store(cfg: &CoreConfig) -> PatientResult<Arc<dyn PatientStore>> {
    let store: Arc<dyn PatientStore> = match cfg.store_backend() {
        StoreBackend::File => Arc::new(FilePatientStore::open(cfg.patients_dir())?),
        StoreBackend::Memory => Arc::new(InMemoryPatientStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn open_store_creates_patients_dir_for_file_backend() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), StoreBackend::File)
            .expect("config");

        let store = open_store(&cfg).expect("open file store");
        assert!(cfg.patients_dir().is_dir());
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn open_store_memory_backend_touches_no_files() {
        let cfg = CoreConfig::new(PathBuf::from("/nonexistent/hps"), StoreBackend::Memory)
            .expect("config");
        let store = open_store(&cfg).expect("open memory store");
        assert!(store.list().expect("list").is_empty());
    }
}
