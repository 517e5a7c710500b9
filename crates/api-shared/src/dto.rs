//! REST request and response bodies.
//!
//! All bodies are camelCase JSON. Enum-valued fields travel as their upper-case names
//! (`MALE`, `ACTIVE`, `HIGH`, ...).

use hps_core::{
    DuplicateCandidate, Gender, NonEmptyText, PageRequest, PatientDetails, PatientError,
    PatientFilter, PatientPage, PatientRecord, PatientResult, PatientStatus, Registration,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Condensed patient view used by listings and duplicate checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub patient_id: String,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub phone_number: Option<String>,
    pub status: String,
    /// Only set on duplicate candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_confidence: Option<String>,
    /// Only set on duplicate candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

impl From<&PatientRecord> for PatientSummary {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_id: record.id.to_string(),
            mrn: record.mrn.to_string(),
            first_name: record.first_name.to_string(),
            last_name: record.last_name.to_string(),
            age: record.age(),
            gender: record.gender.as_str().into(),
            phone_number: record.phone_number.as_ref().map(ToString::to_string),
            status: record.status.as_str().into(),
            match_confidence: None,
            match_reason: None,
        }
    }
}

impl From<&DuplicateCandidate> for PatientSummary {
    fn from(candidate: &DuplicateCandidate) -> Self {
        Self {
            match_confidence: Some(candidate.confidence().as_str().into()),
            match_reason: Some(candidate.reason().into()),
            ..Self::from(&candidate.patient)
        }
    }
}

/// One page of `GET /api/v1/patients`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummaryPage {
    pub content: Vec<PatientSummary>,
    /// Zero-based page index.
    pub number: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl From<&PatientPage> for PatientSummaryPage {
    fn from(page: &PatientPage) -> Self {
        Self {
            content: page.patients.iter().map(PatientSummary::from).collect(),
            number: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
        }
    }
}

/// Full patient view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub patient_id: String,
    /// Medical record number, e.g. `MRN2026001`.
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub date_of_birth: String,
    pub age: u32,
    pub gender: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub blood_group: Option<String>,
    pub known_allergies: Option<String>,
    pub chronic_conditions: Option<String>,
    pub has_allergies: bool,
    pub has_chronic_conditions: bool,
    pub status: String,
    /// RFC 3339 timestamp of registration.
    pub registered_at: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
    /// Set on registration and update when another patient already has this phone number.
    pub duplicate_phone_warning: bool,
}

impl From<&PatientRecord> for PatientResponse {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_id: record.id.to_string(),
            mrn: record.mrn.to_string(),
            first_name: record.first_name.to_string(),
            last_name: record.last_name.to_string(),
            date_of_birth: record.date_of_birth.to_string(),
            age: record.age(),
            gender: record.gender.as_str().into(),
            phone_number: record.phone_number.as_ref().map(ToString::to_string),
            email: record.email.as_ref().map(ToString::to_string),
            address: text(&record.address.line),
            city: text(&record.address.city),
            state: text(&record.address.state),
            zip_code: text(&record.address.postal_code),
            emergency_contact_name: text(&record.emergency_contact.name),
            emergency_contact_phone: record
                .emergency_contact
                .phone
                .as_ref()
                .map(ToString::to_string),
            emergency_contact_relationship: text(&record.emergency_contact.relationship),
            blood_group: text(&record.medical.blood_group),
            known_allergies: text(&record.medical.known_allergies),
            chronic_conditions: text(&record.medical.chronic_conditions),
            has_allergies: record.medical.has_allergies(),
            has_chronic_conditions: record.medical.has_chronic_conditions(),
            status: record.status.as_str().into(),
            registered_at: record.registered_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
            duplicate_phone_warning: false,
        }
    }
}

impl From<&Registration> for PatientResponse {
    fn from(registration: &Registration) -> Self {
        Self {
            duplicate_phone_warning: registration.duplicate_phone_warning,
            ..Self::from(&registration.record)
        }
    }
}

fn text(value: &Option<NonEmptyText>) -> Option<String> {
    value.as_ref().map(ToString::to_string)
}

/// Patient fields for registration (`POST`) and replacement (`PUT`). Blank optional fields
/// are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetailsReq {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date (`YYYY-MM-DD`), strictly in the past.
    pub date_of_birth: String,
    /// `MALE`, `FEMALE` or `OTHER`.
    pub gender: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_phone: Option<String>,
    #[serde(default)]
    pub emergency_contact_relationship: Option<String>,
    /// Free text such as `O+`, at most 10 characters.
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub known_allergies: Option<String>,
    #[serde(default)]
    pub chronic_conditions: Option<String>,
}

impl From<PatientDetailsReq> for PatientDetails {
    fn from(req: PatientDetailsReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            date_of_birth: req.date_of_birth,
            gender: req.gender,
            phone_number: req.phone_number,
            email: req.email,
            address: req.address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            emergency_contact_name: req.emergency_contact_name,
            emergency_contact_phone: req.emergency_contact_phone,
            emergency_contact_relationship: req.emergency_contact_relationship,
            blood_group: req.blood_group,
            known_allergies: req.known_allergies,
            chronic_conditions: req.chronic_conditions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusReq {
    /// `ACTIVE` or `INACTIVE`.
    pub status: String,
}

impl StatusReq {
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] for an unknown status name.
    pub fn status(&self) -> PatientResult<PatientStatus> {
        self.status.parse()
    }
}

/// Query string accepted by `GET /api/v1/patients`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPatientsQuery {
    /// Substring of the patient id, MRN or a name, or an exact phone number or email.
    pub search: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    pub status: Option<String>,
    /// `MALE`, `FEMALE` or `OTHER`.
    pub gender: Option<String>,
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
    /// Zero-based page index (default 0).
    pub page: Option<usize>,
    /// Rows per page (default 20, at most 100).
    pub size: Option<usize>,
}

impl ListPatientsQuery {
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] for a zero page size.
    pub fn page_request(&self) -> PatientResult<PageRequest> {
        let default = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(default.page()),
            self.size.unwrap_or(default.size()),
        )
    }

    /// Convert into a service filter. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] for an unknown status or gender name, or an
    /// inverted birth year range.
    pub fn into_filter(self) -> PatientResult<PatientFilter> {
        let status = non_blank(self.status)
            .map(|s| s.parse::<PatientStatus>())
            .transpose()?;
        let gender = non_blank(self.gender)
            .map(|g| g.parse::<Gender>())
            .transpose()?;

        if let (Some(from), Some(to)) = (self.birth_year_from, self.birth_year_to) {
            if from > to {
                return Err(PatientError::InvalidInput(
                    "birthYearFrom must not be after birthYearTo".into(),
                ));
            }
        }

        Ok(PatientFilter {
            search: non_blank(self.search),
            status,
            gender,
            blood_group: non_blank(self.blood_group),
            city: non_blank(self.city),
            state: non_blank(self.state),
            birth_year_from: self.birth_year_from,
            birth_year_to: self.birth_year_to,
            has_allergies: self.has_allergies,
            has_chronic_conditions: self.has_chronic_conditions,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
