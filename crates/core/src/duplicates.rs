//! Duplicate candidate detection.
//!
//! Given a subject patient and a pool of other patients, each pool entry is classified by
//! the strongest rule it satisfies:
//!
//! | confidence | rule |
//! |------------|------|
//! | HIGH | identical phone digits |
//! | MEDIUM | first and last names share Soundex codes, same birth year |
//! | LOW | first and last names equal ignoring case, same birth year |
//!
//! Rules are tried strongest first and the first hit is kept, so a candidate appears at most
//! once at its highest confidence. An exact name pair almost always satisfies the phonetic
//! rule as well; LOW is reached when the names have no Soundex code at all (for example,
//! names written without Latin letters).
//!
//! Classification is a pure function of the two records.

use crate::record::PatientRecord;
use crate::search_index::MatchKeys;
use hps_uuid::PatientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a candidate resembles the subject. Orders `Low < Medium < High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchConfidence {
    Low,
    Medium,
    High,
}

impl MatchConfidence {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchConfidence::Low => "LOW",
            MatchConfidence::Medium => "MEDIUM",
            MatchConfidence::High => "HIGH",
        }
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that classified a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchRule {
    Phone,
    PhoneticName,
    ExactName,
}

impl MatchRule {
    pub fn confidence(self) -> MatchConfidence {
        match self {
            MatchRule::Phone => MatchConfidence::High,
            MatchRule::PhoneticName => MatchConfidence::Medium,
            MatchRule::ExactName => MatchConfidence::Low,
        }
    }

    /// Human-readable reason shown alongside the candidate.
    pub fn reason(self) -> &'static str {
        match self {
            MatchRule::Phone => "Phone number match",
            MatchRule::PhoneticName => "Name sounds similar + same birth year",
            MatchRule::ExactName => "Exact name + birth year match",
        }
    }
}

/// A patient that may be a duplicate of the subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateCandidate {
    pub patient: PatientRecord,
    pub rule: MatchRule,
}

impl DuplicateCandidate {
    pub fn patient_id(&self) -> &PatientId {
        &self.patient.id
    }

    pub fn confidence(&self) -> MatchConfidence {
        self.rule.confidence()
    }

    pub fn reason(&self) -> &'static str {
        self.rule.reason()
    }
}

/// Classify `candidate` against `subject`, returning the strongest rule that fires.
pub fn classify(subject: &MatchKeys<'_>, candidate: &MatchKeys<'_>) -> Option<MatchRule> {
    if subject.same_phone(candidate) {
        return Some(MatchRule::Phone);
    }
    if !subject.same_birth_year(candidate) {
        return None;
    }
    if subject.sounds_alike(candidate) {
        return Some(MatchRule::PhoneticName);
    }
    if subject.same_name(candidate) {
        return Some(MatchRule::ExactName);
    }
    None
}

/// Find every pool entry that may duplicate `subject`.
///
/// Entries sharing the subject's id are skipped, so the subject is never reported as its
/// own duplicate even if the pool contains it. Results keep pool order.
pub fn find_potential_duplicates<I>(subject: &PatientRecord, pool: I) -> Vec<DuplicateCandidate>
where
    I: IntoIterator<Item = PatientRecord>,
{
    let subject_keys = MatchKeys::from_record(subject);

    pool.into_iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter_map(|candidate| {
            let rule = classify(&subject_keys, &MatchKeys::from_record(&candidate))?;
            Some(DuplicateCandidate {
                patient: candidate,
                rule,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Gender, Mrn, PatientStatus};
    use chrono::NaiveDate;
    use hps_types::{NonEmptyText, PhoneNumber};

    fn patient(first: &str, last: &str, dob: &str, phone: Option<&str>) -> PatientRecord {
        PatientRecord {
            id: PatientId::new(),
            mrn: Mrn::new(2026, 1),
            first_name: NonEmptyText::new(first).unwrap(),
            last_name: NonEmptyText::new(last).unwrap(),
            date_of_birth: NaiveDate::parse_from_str(dob, "%Y-%m-%d").unwrap(),
            gender: Gender::Male,
            phone_number: phone.map(|p| PhoneNumber::parse(p).unwrap()),
            email: None,
            address: Default::default(),
            emergency_contact: Default::default(),
            medical: Default::default(),
            status: PatientStatus::Active,
            registered_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn confidence_of(candidates: &[DuplicateCandidate], id: &PatientId) -> Option<MatchConfidence> {
        candidates
            .iter()
            .find(|c| c.patient_id() == id)
            .map(DuplicateCandidate::confidence)
    }

    #[test]
    fn never_reports_the_subject_itself() {
        let subject = patient("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"));
        let pool = vec![subject.clone(), subject.clone()];
        assert!(find_potential_duplicates(&subject, pool).is_empty());
    }

    #[test]
    fn identical_phone_is_high_in_both_directions() {
        let a = patient("Jonathan", "Williams", "1985-06-15", Some("(555) 987-1111"));
        let b = patient("Dupe", "PhoneTest", "1990-01-01", Some("555-987-1111"));

        let from_a = find_potential_duplicates(&a, vec![b.clone()]);
        let from_b = find_potential_duplicates(&b, vec![a.clone()]);

        assert_eq!(confidence_of(&from_a, &b.id), Some(MatchConfidence::High));
        assert_eq!(confidence_of(&from_b, &a.id), Some(MatchConfidence::High));
        assert_eq!(from_a[0].reason(), "Phone number match");
    }

    #[test]
    fn phonetic_spelling_variant_is_at_least_medium() {
        let subject = patient("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"));
        let variant = patient("Johnathan", "Wylliams", "1985-06-15", Some("555-987-2222"));

        let found = find_potential_duplicates(&subject, vec![variant.clone()]);
        let confidence = confidence_of(&found, &variant.id).expect("variant should match");
        assert!(confidence >= MatchConfidence::Medium);
        assert_eq!(found[0].reason(), "Name sounds similar + same birth year");
    }

    #[test]
    fn phonetic_match_requires_same_birth_year() {
        let subject = patient("Jonathan", "Williams", "1985-06-15", None);
        let variant = patient("Johnathan", "Wylliams", "1986-06-15", None);
        assert!(find_potential_duplicates(&subject, vec![variant]).is_empty());
    }

    #[test]
    fn exact_name_and_birth_year_is_at_least_low() {
        let subject = patient("Maria", "Garcia", "1970-02-01", Some("555-000-0001"));
        let twin = patient("maria", "GARCIA", "1970-11-30", Some("555-000-0002"));

        let found = find_potential_duplicates(&subject, vec![twin.clone()]);
        let confidence = confidence_of(&found, &twin.id).expect("same name should match");
        assert!(confidence >= MatchConfidence::Low);
    }

    #[test]
    fn exact_name_without_soundex_code_is_low() {
        let subject = patient("李", "王", "1970-02-01", None);
        let same = patient("李", "王", "1970-08-09", None);
        let other = patient("张", "王", "1970-08-09", None);

        let found = find_potential_duplicates(&subject, vec![same.clone(), other.clone()]);
        assert_eq!(found.len(), 1);
        assert_eq!(confidence_of(&found, &same.id), Some(MatchConfidence::Low));
        assert_eq!(found[0].reason(), "Exact name + birth year match");
    }

    #[test]
    fn phone_wins_over_name_rules() {
        let subject = patient("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"));
        let both = patient("Jonathan", "Williams", "1985-06-15", Some("5559871111"));

        let found = find_potential_duplicates(&subject, vec![both]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence(), MatchConfidence::High);
    }

    #[test]
    fn missing_phones_do_not_match_each_other() {
        let subject = patient("Alice", "Smith", "1990-01-15", None);
        let other = patient("Bob", "Jones", "1985-06-20", None);
        assert!(find_potential_duplicates(&subject, vec![other]).is_empty());
    }

    #[test]
    fn unique_patient_has_no_candidates() {
        let subject = patient("Xavier", "Quintero", "1962-12-01", Some("555-111-9999"));
        let pool = vec![
            patient("Jonathan", "Williams", "1985-06-15", Some("555-987-1111")),
            patient("Maria", "Garcia", "1970-02-01", Some("555-000-0001")),
            patient("Xavier", "Quintero", "1963-01-01", Some("555-111-0000")),
        ];
        assert!(find_potential_duplicates(&subject, pool).is_empty());
    }

    #[test]
    fn results_keep_pool_order() {
        let subject = patient("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"));
        let first = patient("Johnathan", "Wylliams", "1985-01-01", None);
        let second = patient("Someone", "Else", "1999-09-09", Some("555-987-1111"));

        let found = find_potential_duplicates(&subject, vec![first.clone(), second.clone()]);
        let ids: Vec<_> = found.iter().map(|c| c.patient_id().clone()).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn confidence_orders_low_to_high() {
        assert!(MatchConfidence::Low < MatchConfidence::Medium);
        assert!(MatchConfidence::Medium < MatchConfidence::High);
        assert_eq!(MatchConfidence::Medium.to_string(), "MEDIUM");
    }
}
