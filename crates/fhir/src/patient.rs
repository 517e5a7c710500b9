//! FHIR-aligned patient wire models and translation helpers.
//!
//! Responsibilities:
//! - Define public domain-level types for the patient resource
//! - Define a strict wire model for serialisation/deserialisation
//! - Provide translation helpers between domain primitives and the wire model
//!
//! Notes:
//! - The patient file is mutable and overwritten on every update
//! - Only the first name, address and contact entries, and the first phone/email contact
//!   points, are surfaced
//! - The MRN travels as an `identifier`; clinical flags and the registration time travel as
//!   `extension` entries with `urn:hps:` URLs

use crate::FhirError;
use chrono::{DateTime, Utc};
use hps_uuid::PatientId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameUse {
    Official,
    Usual,
    Nickname,
    Old,
    Maiden,
}

impl NameUse {
    fn to_wire(self) -> &'static str {
        match self {
            NameUse::Official => "official",
            NameUse::Usual => "usual",
            NameUse::Nickname => "nickname",
            NameUse::Old => "old",
            NameUse::Maiden => "maiden",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "official" => Some(NameUse::Official),
            "usual" => Some(NameUse::Usual),
            "nickname" => Some(NameUse::Nickname),
            "old" => Some(NameUse::Old),
            "maiden" => Some(NameUse::Maiden),
            _ => None,
        }
    }
}

/// Administrative gender as recorded at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    fn to_wire(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    fn from_wire(s: &str) -> Result<Self, FhirError> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(FhirError::InvalidInput(format!(
                "unsupported gender '{other}'"
            ))),
        }
    }
}

/// Domain-level carrier for patient data (flat structure).
///
/// The wire format supports multiple names and contact points; this flat structure
/// carries the primary ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Unique identifier for this patient record.
    pub id: PatientId,

    /// Whether the record is in active use (FHIR `active`).
    pub active: bool,

    /// Purpose of the name (official, usual, nickname, etc.).
    pub use_type: Option<NameUse>,

    /// Family name (surname).
    pub family: Option<String>,

    /// Given names (first name, middle names).
    pub given: Vec<String>,

    pub gender: Option<Gender>,

    /// Patient's date of birth (ISO 8601 date format: YYYY-MM-DD).
    pub birth_date: Option<String>,

    /// Primary phone contact point.
    pub phone: Option<String>,

    /// Primary email contact point.
    pub email: Option<String>,

    /// Medical record number (`identifier` with the MRN system).
    pub mrn: Option<String>,

    /// First line of the primary address.
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,

    /// Emergency contact (first `contact` entry).
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_relationship: Option<String>,

    pub blood_group: Option<String>,
    pub known_allergies: Option<String>,
    pub chronic_conditions: Option<String>,

    /// Registration timestamp.
    pub registered_at: Option<DateTime<Utc>>,

    /// Last updated timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl PatientData {
    /// An active patient with only an id.
    pub fn new(id: PatientId) -> Self {
        Self {
            id,
            active: true,
            use_type: None,
            family: None,
            given: Vec::new(),
            gender: None,
            birth_date: None,
            phone: None,
            email: None,
            mrn: None,
            address_line: None,
            city: None,
            state: None,
            postal_code: None,
            contact_name: None,
            contact_phone: None,
            contact_relationship: None,
            blood_group: None,
            known_allergies: None,
            chronic_conditions: None,
            registered_at: None,
            last_updated: None,
        }
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `telecom.0.value`)
    /// to the failing field when the YAML does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidYaml`] if the text is not well-formed YAML, and another
    /// [`FhirError`] if:
    /// - the YAML does not represent a valid patient resource,
    /// - any field has an unexpected type,
    /// - any unknown keys are present (due to `#[serde(deny_unknown_fields)]`),
    /// - resourceType is not "Patient",
    /// - the id, gender or a contact point system is not recognised.
    pub fn parse(yaml_text: &str) -> Result<PatientData, FhirError> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml_text)?;

        let wire = match serde_path_to_error::deserialize::<_, PatientWire>(document) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Patient schema mismatch at {path}: {source}"
                )));
            }
        };

        if wire.resource_type != "Patient" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                wire.resource_type
            )));
        }

        wire_to_domain(wire)
    }

    /// Render a patient resource as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidYaml`] if serialisation fails.
    pub fn render(data: &PatientData) -> Result<String, FhirError> {
        let wire = domain_to_wire(data);
        Ok(serde_yaml::to_string(&wire)?)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a patient resource for on-disk YAML.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentifierWire>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<ContactWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<ExtensionWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PatientMetaWire>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct HumanNameWire {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ContactPointWire {
    pub system: String,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct IdentifierWire {
    pub system: String,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct AddressWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ContactWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<TextWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<TextWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,
}

/// A `CodeableConcept` or `HumanName` carried as free text only.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct TextWire {
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ExtensionWire {
    pub url: String,

    #[serde(rename = "valueString", skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(rename = "valueDateTime", skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
}

impl ExtensionWire {
    fn string(url: &str, value: &Option<String>) -> Option<Self> {
        value.as_ref().map(|v| Self {
            url: url.to_string(),
            value_string: Some(v.clone()),
            value_date_time: None,
        })
    }

    fn into_string(self) -> Result<String, FhirError> {
        self.value_string.ok_or_else(|| {
            FhirError::InvalidInput(format!("extension '{}' needs valueString", self.url))
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientMetaWire {
    #[serde(rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

const PHONE_SYSTEM: &str = "phone";
const EMAIL_SYSTEM: &str = "email";

const MRN_SYSTEM: &str = "urn:hps:mrn";
const BLOOD_GROUP_URL: &str = "urn:hps:blood-group";
const KNOWN_ALLERGIES_URL: &str = "urn:hps:known-allergies";
const CHRONIC_CONDITIONS_URL: &str = "urn:hps:chronic-conditions";
const REGISTERED_AT_URL: &str = "urn:hps:registered-at";

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> Result<PatientData, FhirError> {
    let id = PatientId::parse(&wire.id)
        .map_err(|e| FhirError::Translation(format!("Invalid patient ID: {e}")))?;

    let primary_name = wire.name.into_iter().next();
    let gender = wire.gender.as_deref().map(Gender::from_wire).transpose()?;

    let mut phone = None;
    let mut email = None;
    for point in wire.telecom {
        match point.system.as_str() {
            PHONE_SYSTEM => {
                phone.get_or_insert(point.value);
            }
            EMAIL_SYSTEM => {
                email.get_or_insert(point.value);
            }
            other => {
                return Err(FhirError::InvalidInput(format!(
                    "unsupported contact point system '{other}'"
                )))
            }
        }
    }

    let mut mrn = None;
    for identifier in wire.identifier {
        if identifier.system != MRN_SYSTEM {
            return Err(FhirError::InvalidInput(format!(
                "unsupported identifier system '{}'",
                identifier.system
            )));
        }
        mrn.get_or_insert(identifier.value);
    }

    let address = wire.address.into_iter().next();
    let contact = wire.contact.into_iter().next();

    let mut contact_phone = None;
    if let Some(contact) = &contact {
        for point in &contact.telecom {
            if point.system != PHONE_SYSTEM {
                return Err(FhirError::InvalidInput(format!(
                    "unsupported contact telecom system '{}'",
                    point.system
                )));
            }
            contact_phone.get_or_insert_with(|| point.value.clone());
        }
    }

    let mut blood_group = None;
    let mut known_allergies = None;
    let mut chronic_conditions = None;
    let mut registered_at = None;
    for extension in wire.extension {
        match extension.url.as_str() {
            BLOOD_GROUP_URL => blood_group = Some(extension.into_string()?),
            KNOWN_ALLERGIES_URL => known_allergies = Some(extension.into_string()?),
            CHRONIC_CONDITIONS_URL => chronic_conditions = Some(extension.into_string()?),
            REGISTERED_AT_URL => {
                registered_at = extension
                    .value_date_time
                    .and_then(|s| s.parse::<DateTime<Utc>>().ok());
            }
            other => {
                return Err(FhirError::InvalidInput(format!(
                    "unsupported extension '{other}'"
                )))
            }
        }
    }

    let last_updated = wire
        .meta
        .and_then(|m| m.last_updated)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok());

    Ok(PatientData {
        id,
        active: wire.active,
        use_type: primary_name
            .as_ref()
            .and_then(|n| n.use_type.as_deref())
            .and_then(NameUse::from_wire),
        family: primary_name.as_ref().and_then(|n| n.family.clone()),
        given: primary_name.map(|n| n.given).unwrap_or_default(),
        gender,
        birth_date: wire.birth_date,
        phone,
        email,
        mrn,
        address_line: address.as_ref().and_then(|a| a.line.first().cloned()),
        city: address.as_ref().and_then(|a| a.city.clone()),
        state: address.as_ref().and_then(|a| a.state.clone()),
        postal_code: address.and_then(|a| a.postal_code),
        contact_name: contact.as_ref().and_then(|c| c.name.as_ref().map(|n| n.text.clone())),
        contact_phone,
        contact_relationship: contact
            .and_then(|c| c.relationship.into_iter().next())
            .map(|r| r.text),
        blood_group,
        known_allergies,
        chronic_conditions,
        registered_at,
        last_updated,
    })
}

fn domain_to_wire(data: &PatientData) -> PatientWire {
    let name = if data.use_type.is_some() || data.family.is_some() || !data.given.is_empty() {
        vec![HumanNameWire {
            use_type: data.use_type.map(|u| u.to_wire().to_string()),
            family: data.family.clone(),
            given: data.given.clone(),
        }]
    } else {
        vec![]
    };

    let telecom = [(PHONE_SYSTEM, &data.phone), (EMAIL_SYSTEM, &data.email)]
        .into_iter()
        .filter_map(|(system, value)| {
            value.as_ref().map(|v| ContactPointWire {
                system: system.to_string(),
                value: v.clone(),
            })
        })
        .collect();

    let identifier = data
        .mrn
        .iter()
        .map(|mrn| IdentifierWire {
            system: MRN_SYSTEM.to_string(),
            value: mrn.clone(),
        })
        .collect();

    let address = if data.address_line.is_some()
        || data.city.is_some()
        || data.state.is_some()
        || data.postal_code.is_some()
    {
        vec![AddressWire {
            line: data.address_line.iter().cloned().collect(),
            city: data.city.clone(),
            state: data.state.clone(),
            postal_code: data.postal_code.clone(),
        }]
    } else {
        vec![]
    };

    let contact = if data.contact_name.is_some()
        || data.contact_phone.is_some()
        || data.contact_relationship.is_some()
    {
        vec![ContactWire {
            relationship: data
                .contact_relationship
                .iter()
                .map(|text| TextWire { text: text.clone() })
                .collect(),
            name: data.contact_name.clone().map(|text| TextWire { text }),
            telecom: data
                .contact_phone
                .iter()
                .map(|value| ContactPointWire {
                    system: PHONE_SYSTEM.to_string(),
                    value: value.clone(),
                })
                .collect(),
        }]
    } else {
        vec![]
    };

    let mut extension: Vec<ExtensionWire> = [
        (BLOOD_GROUP_URL, &data.blood_group),
        (KNOWN_ALLERGIES_URL, &data.known_allergies),
        (CHRONIC_CONDITIONS_URL, &data.chronic_conditions),
    ]
    .into_iter()
    .filter_map(|(url, value)| ExtensionWire::string(url, value))
    .collect();
    if let Some(registered_at) = data.registered_at {
        extension.push(ExtensionWire {
            url: REGISTERED_AT_URL.to_string(),
            value_string: None,
            value_date_time: Some(registered_at.to_rfc3339()),
        });
    }

    PatientWire {
        resource_type: "Patient".to_string(),
        id: data.id.to_string(),
        identifier,
        active: data.active,
        name,
        gender: data.gender.map(|g| g.to_wire().to_string()),
        birth_date: data.birth_date.clone(),
        telecom,
        address,
        contact,
        extension,
        meta: data.last_updated.map(|dt| PatientMetaWire {
            last_updated: Some(dt.to_rfc3339()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
identifier:
  - system: urn:hps:mrn
    value: MRN2026001
active: true

name:
  - use: official
    family: Williams
    given:
      - Jonathan

gender: male
birthDate: 1985-06-15

telecom:
  - system: phone
    value: "5559871111"
  - system: email
    value: jonathan@example.com

address:
  - line:
      - 12 Harbour Road
    city: Springfield
    state: IL
    postalCode: "62701"

contact:
  - relationship:
      - text: Spouse
    name:
      text: Mary Williams
    telecom:
      - system: phone
        value: "5559872222"

extension:
  - url: urn:hps:blood-group
    valueString: O+
  - url: urn:hps:known-allergies
    valueString: Penicillin
  - url: urn:hps:registered-at
    valueDateTime: 2026-01-20T09:00:00Z

meta:
  lastUpdated: 2026-01-23T13:58:04.099304Z
"#;

    #[test]
    fn parses_sample_yaml() {
        let patient = Patient::parse(SAMPLE).expect("parse yaml");
        assert!(patient.active);
        assert_eq!(patient.use_type, Some(NameUse::Official));
        assert_eq!(patient.family.as_deref(), Some("Williams"));
        assert_eq!(patient.given, vec!["Jonathan"]);
        assert_eq!(patient.gender, Some(Gender::Male));
        assert_eq!(patient.birth_date.as_deref(), Some("1985-06-15"));
        assert_eq!(patient.phone.as_deref(), Some("5559871111"));
        assert_eq!(patient.email.as_deref(), Some("jonathan@example.com"));
        assert!(patient.last_updated.is_some());
    }

    #[test]
    fn parses_identifier_address_contact_and_extensions() {
        let patient = Patient::parse(SAMPLE).expect("parse yaml");
        assert_eq!(patient.mrn.as_deref(), Some("MRN2026001"));
        assert_eq!(patient.address_line.as_deref(), Some("12 Harbour Road"));
        assert_eq!(patient.city.as_deref(), Some("Springfield"));
        assert_eq!(patient.state.as_deref(), Some("IL"));
        assert_eq!(patient.postal_code.as_deref(), Some("62701"));
        assert_eq!(patient.contact_name.as_deref(), Some("Mary Williams"));
        assert_eq!(patient.contact_phone.as_deref(), Some("5559872222"));
        assert_eq!(patient.contact_relationship.as_deref(), Some("Spouse"));
        assert_eq!(patient.blood_group.as_deref(), Some("O+"));
        assert_eq!(patient.known_allergies.as_deref(), Some("Penicillin"));
        assert_eq!(patient.chronic_conditions, None);
        assert_eq!(
            patient.registered_at,
            Some("2026-01-20T09:00:00Z".parse().expect("timestamp"))
        );
    }

    #[test]
    fn rejects_unknown_identifier_system_and_extension() {
        let identifier = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
identifier:
  - system: urn:other:nhs
    value: "9434765919"
"#;
        assert!(matches!(
            Patient::parse(identifier),
            Err(FhirError::InvalidInput(_))
        ));

        let extension = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
extension:
  - url: urn:hps:favourite-colour
    valueString: blue
"#;
        assert!(matches!(
            Patient::parse(extension),
            Err(FhirError::InvalidInput(_))
        ));

        let wrong_value = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
extension:
  - url: urn:hps:blood-group
    valueDateTime: 2026-01-20T09:00:00Z
"#;
        assert!(matches!(
            Patient::parse(wrong_value),
            Err(FhirError::InvalidInput(_))
        ));
    }

    #[test]
    fn rendered_yaml_parses_back_to_same_data() {
        let patient = Patient::parse(SAMPLE).expect("parse yaml");
        let output = Patient::render(&patient).expect("render patient");
        assert_eq!(Patient::parse(&output).expect("reparse yaml"), patient);
    }

    #[test]
    fn missing_active_defaults_to_true() {
        let input = "resourceType: Patient\nid: 90a8d1ea318041d9adb070a834d4e0f6\n";
        let patient = Patient::parse(input).expect("should parse minimal patient");
        assert!(patient.active);
        assert!(patient.given.is_empty());
        assert!(patient.phone.is_none());
    }

    #[test]
    fn inactive_flag_is_preserved() {
        let input = "resourceType: Patient\nid: 90a8d1ea318041d9adb070a834d4e0f6\nactive: false\n";
        let patient = Patient::parse(input).expect("should parse inactive patient");
        assert!(!patient.active);
        let yaml = Patient::render(&patient).expect("render");
        assert!(yaml.contains("active: false"));
    }

    #[test]
    fn malformed_yaml_is_reported_as_invalid_yaml() {
        let input = "invalid: yaml: content: [[[";
        assert!(matches!(
            Patient::parse(input),
            Err(FhirError::InvalidYaml(_))
        ));
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
unexpected_key: should_fail
"#;

        match Patient::parse(input).expect_err("should reject unknown key") {
            FhirError::Translation(msg) => assert!(msg.contains("unexpected_key")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn strict_validation_reports_path_of_wrong_type() {
        let input = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
telecom:
  - system: phone
    value: [1, 2]
"#;

        match Patient::parse(input).expect_err("should reject wrong type") {
            FhirError::Translation(msg) => assert!(msg.contains("telecom")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_resource_type() {
        let input = "resourceType: Practitioner\nid: 90a8d1ea318041d9adb070a834d4e0f6\n";
        match Patient::parse(input).expect_err("should reject resourceType") {
            FhirError::InvalidInput(msg) => assert!(msg.contains("Practitioner")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_gender_and_contact_system() {
        let gender = "resourceType: Patient\nid: 90a8d1ea318041d9adb070a834d4e0f6\ngender: robot\n";
        assert!(matches!(
            Patient::parse(gender),
            Err(FhirError::InvalidInput(_))
        ));

        let fax = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
telecom:
  - system: fax
    value: "5551234567"
"#;
        assert!(matches!(Patient::parse(fax), Err(FhirError::InvalidInput(_))));
    }

    #[test]
    fn rejects_non_canonical_id() {
        let input = "resourceType: Patient\nid: P2026001\n";
        assert!(matches!(
            Patient::parse(input),
            Err(FhirError::Translation(_))
        ));
    }

    #[test]
    fn renders_minimal_patient_without_optional_sections() {
        let data = PatientData::new(
            PatientId::parse("00000000000000000000000000000001").expect("valid id"),
        );

        let yaml = Patient::render(&data).expect("should render minimal patient");
        assert!(yaml.contains("resourceType: Patient"));
        assert!(!yaml.contains("name:"));
        assert!(!yaml.contains("telecom:"));
        assert!(!yaml.contains("address:"));
        assert!(!yaml.contains("contact:"));
        assert!(!yaml.contains("extension:"));
        assert!(!yaml.contains("meta:"));
    }
}
