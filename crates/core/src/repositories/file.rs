//! File-backed patient store.
//!
//! ## Storage Layout
//!
//! ```text
//! patients/
//!   <s1>/
//!     <s2>/
//!       <id>/
//!         patient.yaml    # FHIR-aligned patient resource
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the patient id.

use super::PatientStore;
use crate::constants::PATIENT_YAML_FILENAME;
use crate::error::{PatientError, PatientResult};
use crate::record::PatientRecord;
use fhir::Patient;
use hps_uuid::PatientId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FilePatientStore {
    patients_dir: PathBuf,
}

impl FilePatientStore {
    /// Open a store rooted at `patients_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageDirCreation`] if the directory cannot be created.
    pub fn open(patients_dir: PathBuf) -> PatientResult<Self> {
        fs::create_dir_all(&patients_dir).map_err(PatientError::StorageDirCreation)?;
        Ok(Self { patients_dir })
    }

    pub fn patients_dir(&self) -> &Path {
        &self.patients_dir
    }

    fn patient_file(&self, id: &PatientId) -> PathBuf {
        id.sharded_dir(&self.patients_dir).join(PATIENT_YAML_FILENAME)
    }

    fn write_record(&self, path: &Path, record: &PatientRecord) -> PatientResult<()> {
        let yaml = Patient::render(&record.to_fhir())?;
        fs::write(path, yaml).map_err(PatientError::FileWrite)
    }

    fn read_record(path: &Path) -> PatientResult<PatientRecord> {
        let bytes = fs::read(path).map_err(PatientError::FileRead)?;
        decode_record(bytes)
    }
}

/// Decode file contents. Invalid UTF-8 is a content error, not an I/O error.
fn decode_record(bytes: Vec<u8>) -> PatientResult<PatientRecord> {
    let contents = String::from_utf8(bytes)?;
    PatientRecord::from_fhir(Patient::parse(&contents)?)
}

/// Subdirectories of `dir`; plain files are ignored.
fn child_dirs(dir: &Path) -> PatientResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(PatientError::FileRead)? {
        let path = entry.map_err(PatientError::FileRead)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

impl PatientStore for FilePatientStore {
    fn get(&self, id: &PatientId) -> PatientResult<Option<PatientRecord>> {
        let path = self.patient_file(id);
        match fs::read(&path) {
            Ok(bytes) => decode_record(bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PatientError::FileRead(e)),
        }
    }

    /// Traverses `<s1>/<s2>/<id>/patient.yaml`.
    ///
    /// Files that fail to decode or parse are logged and skipped; I/O failures are returned.
    fn list(&self) -> PatientResult<Vec<PatientRecord>> {
        let mut patients = Vec::new();

        if !self.patients_dir.is_dir() {
            return Ok(patients);
        }

        for s1 in child_dirs(&self.patients_dir)? {
            for s2 in child_dirs(&s1)? {
                for id_dir in child_dirs(&s2)? {
                    let patient_path = id_dir.join(PATIENT_YAML_FILENAME);
                    if !patient_path.is_file() {
                        continue;
                    }

                    match Self::read_record(&patient_path) {
                        Ok(record) => patients.push(record),
                        Err(PatientError::FileRead(e)) => return Err(PatientError::FileRead(e)),
                        Err(e) => {
                            tracing::warn!(
                                "failed to load {}: {}",
                                patient_path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        Ok(patients)
    }

    fn insert(&self, record: &PatientRecord) -> PatientResult<()> {
        let patient_dir = record.id.sharded_dir(&self.patients_dir);

        if let Some(parent) = patient_dir.parent() {
            fs::create_dir_all(parent).map_err(PatientError::PatientDirCreation)?;
        }
        match fs::create_dir(&patient_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PatientError::AlreadyExists(record.id.clone()))
            }
            Err(e) => return Err(PatientError::PatientDirCreation(e)),
        }

        let path = patient_dir.join(PATIENT_YAML_FILENAME);
        if let Err(write_error) = self.write_record(&path, record) {
            if let Err(cleanup_error) = fs::remove_dir_all(&patient_dir) {
                tracing::error!(
                    "failed to clean up {} after write error: {}",
                    patient_dir.display(),
                    cleanup_error
                );
            }
            return Err(write_error);
        }
        Ok(())
    }

    fn update(&self, record: &PatientRecord) -> PatientResult<()> {
        let path = self.patient_file(&record.id);
        if !path.is_file() {
            return Err(PatientError::NotFound(record.id.clone()));
        }
        self.write_record(&path, record)
    }
}
