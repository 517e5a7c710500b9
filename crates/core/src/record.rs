//! Patient record domain model.
//!
//! [`PatientRecord`] is the validated in-memory form of a registered patient, identified by
//! its [`PatientId`] and its human-facing [`Mrn`]. Raw input from
//! callers arrives as [`PatientDetails`] and is validated into a record by the service; stored
//! records round-trip through the FHIR-aligned [`fhir::PatientData`] wire model.

use crate::constants::{
    MAX_BLOOD_GROUP_LEN, MAX_LOCALITY_LEN, MAX_NAME_LEN, MAX_POSTAL_CODE_LEN, MAX_TEXT_LEN,
};
use crate::{PatientError, PatientResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use fhir::{NameUse, PatientData};
use hps_types::{EmailAddress, NonEmptyText, PhoneNumber};
use hps_uuid::PatientId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(PatientError::InvalidInput(format!("unknown gender '{other}'"))),
        }
    }
}

impl From<Gender> for fhir::Gender {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => fhir::Gender::Male,
            Gender::Female => fhir::Gender::Female,
            Gender::Other => fhir::Gender::Other,
        }
    }
}

impl From<fhir::Gender> for Gender {
    fn from(value: fhir::Gender) -> Self {
        match value {
            fhir::Gender::Male => Gender::Male,
            fhir::Gender::Female => Gender::Female,
            fhir::Gender::Other => Gender::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatientStatus {
    Active,
    Inactive,
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for PatientStatus {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(PatientStatus::Active),
            "INACTIVE" => Ok(PatientStatus::Inactive),
            other => Err(PatientError::InvalidInput(format!("unknown status '{other}'"))),
        }
    }
}

/// Medical record number: `MRN`, the four-digit year of issue and a sequence number padded to
/// at least three digits (`MRN2026001`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mrn(String);

impl Mrn {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self(format!("MRN{year:04}{sequence:03}"))
    }

    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] unless `input` is `MRN` followed by a year and a
    /// sequence of at least three digits.
    pub fn parse(input: &str) -> PatientResult<Self> {
        let input = input.trim();
        match input.strip_prefix("MRN") {
            Some(digits) if digits.len() >= 7 && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self(input.to_string()))
            }
            _ => Err(PatientError::InvalidInput(format!(
                "malformed medical record number '{input}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sequence number, if this MRN was issued in `year`.
    pub fn sequence_in(&self, year: i32) -> Option<u32> {
        self.0
            .strip_prefix("MRN")?
            .strip_prefix(&format!("{year:04}"))?
            .parse()
            .ok()
    }
}

impl std::fmt::Display for Mrn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub line: Option<NonEmptyText>,
    pub city: Option<NonEmptyText>,
    pub state: Option<NonEmptyText>,
    pub postal_code: Option<NonEmptyText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: Option<NonEmptyText>,
    pub phone: Option<PhoneNumber>,
    pub relationship: Option<NonEmptyText>,
}

/// Free-text medical information recorded with the demographics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MedicalInfo {
    pub blood_group: Option<NonEmptyText>,
    pub known_allergies: Option<NonEmptyText>,
    pub chronic_conditions: Option<NonEmptyText>,
}

impl MedicalInfo {
    pub fn has_allergies(&self) -> bool {
        self.known_allergies.is_some()
    }

    pub fn has_chronic_conditions(&self) -> bool {
        self.chronic_conditions.is_some()
    }
}

/// A registered patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: PatientId,
    pub mrn: Mrn,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
    pub address: Address,
    pub emergency_contact: EmergencyContact,
    pub medical: MedicalInfo,
    pub status: PatientStatus,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientRecord {
    pub fn is_active(&self) -> bool {
        self.status == PatientStatus::Active
    }

    pub fn birth_year(&self) -> i32 {
        self.date_of_birth.year()
    }

    /// Age in completed years on `today`; 0 when the birth date lies after `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    /// Age in completed years on the current UTC date.
    pub fn age(&self) -> u32 {
        self.age_on(Utc::now().date_naive())
    }

    pub(crate) fn to_fhir(&self) -> PatientData {
        let text = |value: &Option<NonEmptyText>| value.as_ref().map(ToString::to_string);
        PatientData {
            active: self.is_active(),
            use_type: Some(NameUse::Official),
            family: Some(self.last_name.to_string()),
            given: vec![self.first_name.to_string()],
            gender: Some(self.gender.into()),
            birth_date: Some(self.date_of_birth.format("%Y-%m-%d").to_string()),
            phone: self.phone_number.as_ref().map(ToString::to_string),
            email: self.email.as_ref().map(ToString::to_string),
            mrn: Some(self.mrn.to_string()),
            address_line: text(&self.address.line),
            city: text(&self.address.city),
            state: text(&self.address.state),
            postal_code: text(&self.address.postal_code),
            contact_name: text(&self.emergency_contact.name),
            contact_phone: self.emergency_contact.phone.as_ref().map(ToString::to_string),
            contact_relationship: text(&self.emergency_contact.relationship),
            blood_group: text(&self.medical.blood_group),
            known_allergies: text(&self.medical.known_allergies),
            chronic_conditions: text(&self.medical.chronic_conditions),
            registered_at: Some(self.registered_at),
            last_updated: Some(self.updated_at),
            ..PatientData::new(self.id.clone())
        }
    }

    /// Rebuild a record from its stored wire form.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::IncompleteRecord`] when a field required for a registered
    /// patient is missing or malformed in the stored resource.
    pub(crate) fn from_fhir(data: PatientData) -> PatientResult<Self> {
        let id = data.id;
        let incomplete = |reason: &str| PatientError::IncompleteRecord {
            id: id.clone(),
            reason: reason.to_string(),
        };
        let text = |value: Option<String>| value.and_then(|v| NonEmptyText::new(v).ok());

        let mrn = data
            .mrn
            .as_deref()
            .and_then(|m| Mrn::parse(m).ok())
            .ok_or_else(|| incomplete("missing or malformed MRN identifier"))?;
        let first_name = data
            .given
            .first()
            .and_then(|g| NonEmptyText::new(g).ok())
            .ok_or_else(|| incomplete("missing given name"))?;
        let last_name = data
            .family
            .as_deref()
            .and_then(|f| NonEmptyText::new(f).ok())
            .ok_or_else(|| incomplete("missing family name"))?;
        let date_of_birth = data
            .birth_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| incomplete("missing or malformed birthDate"))?;
        let gender = data
            .gender
            .map(Gender::from)
            .ok_or_else(|| incomplete("missing gender"))?;
        let phone_number = data
            .phone
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|_| incomplete("malformed phone contact point"))?;
        let email = data
            .email
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|_| incomplete("malformed email contact point"))?;
        let contact_phone = data
            .contact_phone
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|_| incomplete("malformed emergency contact phone"))?;
        let registered_at = data
            .registered_at
            .ok_or_else(|| incomplete("missing registered-at extension"))?;
        let updated_at = data
            .last_updated
            .ok_or_else(|| incomplete("missing meta.lastUpdated"))?;

        Ok(Self {
            mrn,
            first_name,
            last_name,
            date_of_birth,
            gender,
            phone_number,
            email,
            address: Address {
                line: text(data.address_line),
                city: text(data.city),
                state: text(data.state),
                postal_code: text(data.postal_code),
            },
            emergency_contact: EmergencyContact {
                name: text(data.contact_name),
                phone: contact_phone,
                relationship: text(data.contact_relationship),
            },
            medical: MedicalInfo {
                blood_group: text(data.blood_group),
                known_allergies: text(data.known_allergies),
                chronic_conditions: text(data.chronic_conditions),
            },
            status: if data.active {
                PatientStatus::Active
            } else {
                PatientStatus::Inactive
            },
            registered_at,
            updated_at,
            id,
        })
    }
}

/// Unvalidated patient fields, as supplied at registration or update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientDetails {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub date_of_birth: String,
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
}

/// The validated form of [`PatientDetails`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ValidDetails {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: Option<PhoneNumber>,
    pub email: Option<EmailAddress>,
    pub address: Address,
    pub emergency_contact: EmergencyContact,
    pub medical: MedicalInfo,
}

impl PatientDetails {
    /// Validate the details against `today`.
    ///
    /// Blank optional fields are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidField`] for malformed names, phones, email or an
    /// over-long optional field, and [`PatientError::InvalidInput`] for a malformed or
    /// non-past date of birth or an unknown gender.
    pub(crate) fn validate(self, today: NaiveDate) -> PatientResult<ValidDetails> {
        let first_name = NonEmptyText::with_max_len(&self.first_name, MAX_NAME_LEN)
            .map_err(|source| PatientError::InvalidField {
                field: "firstName",
                source,
            })?;
        let last_name = NonEmptyText::with_max_len(&self.last_name, MAX_NAME_LEN).map_err(
            |source| PatientError::InvalidField {
                field: "lastName",
                source,
            },
        )?;

        let date_of_birth = NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d")
            .map_err(|_| {
                PatientError::InvalidInput("dateOfBirth must be in format YYYY-MM-DD".into())
            })?;
        if date_of_birth >= today {
            return Err(PatientError::InvalidInput(
                "dateOfBirth must be in the past".into(),
            ));
        }

        let gender = self.gender.parse::<Gender>()?;

        let phone_number = optional_phone(self.phone_number, "phoneNumber")?;
        let email = non_blank(self.email)
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|source| PatientError::InvalidField {
                field: "email",
                source,
            })?;

        let address = Address {
            line: optional_text(self.address, "address", MAX_TEXT_LEN)?,
            city: optional_text(self.city, "city", MAX_LOCALITY_LEN)?,
            state: optional_text(self.state, "state", MAX_LOCALITY_LEN)?,
            postal_code: optional_text(self.zip_code, "zipCode", MAX_POSTAL_CODE_LEN)?,
        };
        let emergency_contact = EmergencyContact {
            name: optional_text(self.emergency_contact_name, "emergencyContactName", MAX_TEXT_LEN)?,
            phone: optional_phone(self.emergency_contact_phone, "emergencyContactPhone")?,
            relationship: optional_text(
                self.emergency_contact_relationship,
                "emergencyContactRelationship",
                MAX_LOCALITY_LEN,
            )?,
        };
        let medical = MedicalInfo {
            blood_group: optional_text(self.blood_group, "bloodGroup", MAX_BLOOD_GROUP_LEN)?,
            known_allergies: optional_text(self.known_allergies, "knownAllergies", MAX_TEXT_LEN)?,
            chronic_conditions: optional_text(
                self.chronic_conditions,
                "chronicConditions",
                MAX_TEXT_LEN,
            )?,
        };

        Ok(ValidDetails {
            first_name,
            last_name,
            date_of_birth,
            gender,
            phone_number,
            email,
            address,
            emergency_contact,
            medical,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> PatientResult<Option<NonEmptyText>> {
    non_blank(value)
        .map(|v| NonEmptyText::with_max_len(v, max))
        .transpose()
        .map_err(|source| PatientError::InvalidField { field, source })
}

fn optional_phone(value: Option<String>, field: &'static str) -> PatientResult<Option<PhoneNumber>> {
    non_blank(value)
        .map(PhoneNumber::parse)
        .transpose()
        .map_err(|source| PatientError::InvalidField { field, source })
}
