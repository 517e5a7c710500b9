//! Process-local patient store.

use super::PatientStore;
use crate::error::{PatientError, PatientResult};
use crate::record::PatientRecord;
use hps_uuid::PatientId;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Patient store backed by a map behind a read-write lock. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<BTreeMap<PatientId, PatientRecord>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientStore for InMemoryPatientStore {
    fn get(&self, id: &PatientId) -> PatientResult<Option<PatientRecord>> {
        let patients = self.patients.read().map_err(|_| PatientError::StorePoisoned)?;
        Ok(patients.get(id).cloned())
    }

    fn list(&self) -> PatientResult<Vec<PatientRecord>> {
        let patients = self.patients.read().map_err(|_| PatientError::StorePoisoned)?;
        Ok(patients.values().cloned().collect())
    }

    fn insert(&self, record: &PatientRecord) -> PatientResult<()> {
        let mut patients = self.patients.write().map_err(|_| PatientError::StorePoisoned)?;
        if patients.contains_key(&record.id) {
            return Err(PatientError::AlreadyExists(record.id.clone()));
        }
        patients.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn update(&self, record: &PatientRecord) -> PatientResult<()> {
        let mut patients = self.patients.write().map_err(|_| PatientError::StorePoisoned)?;
        match patients.get_mut(&record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(PatientError::NotFound(record.id.clone())),
        }
    }
}
