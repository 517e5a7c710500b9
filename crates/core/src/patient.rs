//! Patient service.
//!
//! [`PatientService`] owns the business rules for registering, updating and searching
//! patients, and answers duplicate-candidate queries. Storage is delegated to a
//! [`PatientStore`]; validation happens here so every store sees only complete records.
//!
//! Writes go through a service-wide lock so a read-modify-write on one patient never
//! overwrites a concurrent change, and MRN sequence numbers are never issued twice. The lock
//! is process-local: two processes sharing one data directory are not serialised.
//!
//! Log lines carry patient ids only, never names, phone numbers or emails.

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::duplicates::{self, DuplicateCandidate};
use crate::error::{PatientError, PatientResult};
use crate::record::{Gender, Mrn, PatientDetails, PatientRecord, PatientStatus, ValidDetails};
use crate::repositories::PatientStore;
use crate::search_index::name_search_token;
use chrono::{Datelike, Utc};
use hps_types::{NonEmptyText, PhoneNumber};
use hps_uuid::PatientId;
use std::sync::{Arc, Mutex, MutexGuard};

/// Attempts at allocating an unused id before registration gives up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Outcome of a registration or an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub record: PatientRecord,
    /// Another patient already has the same phone number. The write still happened.
    pub duplicate_phone_warning: bool,
}

/// Optional criteria for [`PatientService::list_patients`]. Unset or blank criteria match
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientFilter {
    /// Substring of the id, MRN or either name (case-insensitive), or an exact phone number
    /// or email address.
    pub search: Option<String>,
    pub status: Option<PatientStatus>,
    pub gender: Option<Gender>,
    /// Exact blood group, ignoring case.
    pub blood_group: Option<String>,
    /// Substring of the city, ignoring case.
    pub city: Option<String>,
    /// Substring of the state, ignoring case.
    pub state: Option<String>,
    pub birth_year_from: Option<i32>,
    pub birth_year_to: Option<i32>,
    pub has_allergies: Option<bool>,
    pub has_chronic_conditions: Option<bool>,
}

impl PatientFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.gender.is_some_and(|g| g != record.gender) {
            return false;
        }
        let year = record.birth_year();
        if self.birth_year_from.is_some_and(|from| year < from) {
            return false;
        }
        if self.birth_year_to.is_some_and(|to| year > to) {
            return false;
        }
        if self
            .has_allergies
            .is_some_and(|wanted| wanted != record.medical.has_allergies())
        {
            return false;
        }
        if self
            .has_chronic_conditions
            .is_some_and(|wanted| wanted != record.medical.has_chronic_conditions())
        {
            return false;
        }

        if let Some(group) = criterion(&self.blood_group) {
            let hit = record
                .medical
                .blood_group
                .as_ref()
                .is_some_and(|g| g.as_str().eq_ignore_ascii_case(group));
            if !hit {
                return false;
            }
        }
        if let Some(city) = criterion(&self.city) {
            if !contains_ignoring_case(record.address.city.as_ref(), city) {
                return false;
            }
        }
        if let Some(state) = criterion(&self.state) {
            if !contains_ignoring_case(record.address.state.as_ref(), state) {
                return false;
            }
        }

        match criterion(&self.search) {
            None => true,
            Some(term) => search_matches(term, record),
        }
    }
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignoring_case(value: Option<&NonEmptyText>, needle: &str) -> bool {
    value.is_some_and(|v| name_search_token(v.as_str()).contains(&name_search_token(needle)))
}

fn search_matches(term: &str, record: &PatientRecord) -> bool {
    let needle = name_search_token(term);
    if record.id.to_string().contains(&needle)
        || name_search_token(record.mrn.as_str()).contains(&needle)
        || name_search_token(record.first_name.as_str()).contains(&needle)
        || name_search_token(record.last_name.as_str()).contains(&needle)
    {
        return true;
    }

    let phone_hit = match (PhoneNumber::parse(term), &record.phone_number) {
        (Ok(wanted), Some(phone)) => wanted.digits() == phone.digits(),
        _ => false,
    };
    let email_hit = record
        .email
        .as_ref()
        .is_some_and(|email| email.as_str().eq_ignore_ascii_case(term));

    phone_hit || email_hit
}

/// Zero-based page of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    /// `size` above [`MAX_PAGE_SIZE`] is clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `size` is zero.
    pub fn new(page: usize, size: usize) -> PatientResult<Self> {
        if size == 0 {
            return Err(PatientError::InvalidInput(
                "page size must be at least 1".into(),
            ));
        }
        Ok(Self {
            page,
            size: size.min(MAX_PAGE_SIZE),
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of [`PatientService::search_patients`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientPage {
    pub patients: Vec<PatientRecord>,
    pub page: usize,
    pub size: usize,
    /// Matching patients across all pages.
    pub total_elements: usize,
}

impl PatientPage {
    pub fn total_pages(&self) -> usize {
        self.total_elements.div_ceil(self.size)
    }
}

/// Pure patient data operations - no API concerns.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock_writes(&self) -> PatientResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| PatientError::StorePoisoned)
    }

    /// Validate `details` and register a new active patient with the next MRN of the
    /// current year.
    ///
    /// A phone number already held by another patient does not block registration; it is
    /// reported through [`Registration::duplicate_phone_warning`].
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` if:
    /// - any field fails validation,
    /// - an unused id cannot be allocated,
    /// - the store fails.
    pub fn register_patient(&self, details: PatientDetails) -> PatientResult<Registration> {
        let now = Utc::now();
        let valid = details.validate(now.date_naive())?;

        let _guard = self.lock_writes()?;
        let existing = self.store.list()?;
        let duplicate_phone_warning = phone_in_use(&existing, valid.phone_number.as_ref(), None);
        let mrn = next_mrn(&existing, now.year());

        let mut attempts = 0;
        let record = loop {
            attempts += 1;
            let record = new_record(PatientId::new(), mrn.clone(), valid.clone());
            match self.store.insert(&record) {
                Ok(()) => break record,
                Err(PatientError::AlreadyExists(id)) if attempts < MAX_ID_ATTEMPTS => {
                    tracing::warn!(patient_id = %id, "patient id collision, retrying");
                }
                Err(e) => return Err(e),
            }
        };

        if duplicate_phone_warning {
            tracing::warn!(
                patient_id = %record.id,
                "registered patient shares a phone number with an existing patient"
            );
        }
        tracing::info!(patient_id = %record.id, mrn = %record.mrn, "patient registered");

        Ok(Registration {
            record,
            duplicate_phone_warning,
        })
    }

    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no patient has this id.
    pub fn get_patient(&self, id: &PatientId) -> PatientResult<PatientRecord> {
        self.store
            .get(id)?
            .ok_or_else(|| PatientError::NotFound(id.clone()))
    }

    /// Patients matching `filter`, sorted by last name then first name (case-insensitive).
    pub fn list_patients(&self, filter: &PatientFilter) -> PatientResult<Vec<PatientRecord>> {
        let mut patients: Vec<PatientRecord> = self
            .store
            .list()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();

        patients.sort_by_cached_key(|p| {
            (
                name_search_token(p.last_name.as_str()),
                name_search_token(p.first_name.as_str()),
                p.id.clone(),
            )
        });
        Ok(patients)
    }

    /// One page of [`Self::list_patients`]. A page past the end is empty.
    pub fn search_patients(
        &self,
        filter: &PatientFilter,
        page: PageRequest,
    ) -> PatientResult<PatientPage> {
        let matching = self.list_patients(filter)?;
        let total_elements = matching.len();
        let patients = matching
            .into_iter()
            .skip(page.page().saturating_mul(page.size()))
            .take(page.size())
            .collect();

        Ok(PatientPage {
            patients,
            page: page.page(),
            size: page.size(),
            total_elements,
        })
    }

    /// Replace the demographic, contact and medical fields of an existing patient.
    ///
    /// The id, MRN, status and registration time are kept; `updated_at` is stamped.
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` if the patient does not exist, validation fails or the store
    /// fails.
    pub fn update_patient(
        &self,
        id: &PatientId,
        details: PatientDetails,
    ) -> PatientResult<Registration> {
        let valid = details.validate(Utc::now().date_naive())?;

        let _guard = self.lock_writes()?;
        let existing = self.get_patient(id)?;
        let duplicate_phone_warning =
            phone_in_use(&self.store.list()?, valid.phone_number.as_ref(), Some(id));

        let record = PatientRecord {
            status: existing.status,
            registered_at: existing.registered_at,
            ..new_record(existing.id, existing.mrn, valid)
        };
        self.store.update(&record)?;
        tracing::info!(patient_id = %record.id, "patient updated");

        Ok(Registration {
            record,
            duplicate_phone_warning,
        })
    }

    /// Activate or deactivate a patient. Inactive patients are never duplicate candidates.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no patient has this id, or a store error.
    pub fn set_status(&self, id: &PatientId, status: PatientStatus) -> PatientResult<PatientRecord> {
        let _guard = self.lock_writes()?;
        let mut record = self.get_patient(id)?;
        if record.status == status {
            return Ok(record);
        }

        record.status = status;
        record.updated_at = Utc::now();
        self.store.update(&record)?;
        tracing::info!(patient_id = %record.id, status = ?status, "patient status changed");
        Ok(record)
    }

    /// Active patients that may be duplicates of the patient with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no patient has this id, or a store error.
    pub fn find_potential_duplicates(
        &self,
        id: &PatientId,
    ) -> PatientResult<Vec<DuplicateCandidate>> {
        let subject = self.get_patient(id)?;
        let pool = self.store.list_active_excluding(id)?;
        let candidates = duplicates::find_potential_duplicates(&subject, pool);

        tracing::debug!(
            patient_id = %id,
            candidates = candidates.len(),
            "duplicate check complete"
        );
        Ok(candidates)
    }
}

/// Whether some patient other than `except` already has `phone`.
fn phone_in_use(
    patients: &[PatientRecord],
    phone: Option<&PhoneNumber>,
    except: Option<&PatientId>,
) -> bool {
    let Some(phone) = phone else {
        return false;
    };
    patients.iter().any(|p| {
        Some(&p.id) != except
            && p.phone_number
                .as_ref()
                .is_some_and(|other| other.digits() == phone.digits())
    })
}

/// The MRN after the highest one issued in `year`.
fn next_mrn(patients: &[PatientRecord], year: i32) -> Mrn {
    let last = patients
        .iter()
        .filter_map(|p| p.mrn.sequence_in(year))
        .max()
        .unwrap_or(0);
    Mrn::new(year, last + 1)
}

fn new_record(id: PatientId, mrn: Mrn, valid: ValidDetails) -> PatientRecord {
    let now = Utc::now();
    PatientRecord {
        id,
        mrn,
        first_name: valid.first_name,
        last_name: valid.last_name,
        date_of_birth: valid.date_of_birth,
        gender: valid.gender,
        phone_number: valid.phone_number,
        email: valid.email,
        address: valid.address,
        emergency_contact: valid.emergency_contact,
        medical: valid.medical,
        status: PatientStatus::Active,
        registered_at: now,
        updated_at: now,
    }
}
