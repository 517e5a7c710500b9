//! Derived search keys for patient matching.
//!
//! Nothing here is persisted. Keys are recomputed from a [`PatientRecord`] whenever a
//! comparison is needed:
//!
//! - name search tokens: trimmed, lowercased names for exact and substring matching
//! - Soundex codes: American Soundex of each name for phonetic matching
//! - birth year and digits-only phone, taken straight from the record

use crate::record::PatientRecord;
use std::fmt;

/// A four-character American Soundex code: one letter followed by three digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoundexCode(String);

impl SoundexCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundexCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode `name` with the American Soundex algorithm.
///
/// Only ASCII letters are considered, so `"O'Brien"` encodes like `"OBrien"`. The first
/// letter is kept; later letters map to digit classes, adjacent letters of one class
/// collapse to a single digit (including against the first letter), `H` and `W` are
/// transparent to that collapsing, and vowels (plus `Y`) separate repeats. The result is
/// padded with zeros or truncated to one letter and three digits.
///
/// Returns `None` when `name` has no ASCII letters. Callers must treat a missing code as
/// "no phonetic information": two `None`s are not a match.
pub fn soundex(name: &str) -> Option<SoundexCode> {
    let mut letters = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase());

    let first = letters.next()?;
    let mut code = String::with_capacity(4);
    code.push(first);

    let mut previous = soundex_digit(first);
    for letter in letters {
        if code.len() == 4 {
            break;
        }
        if matches!(letter, 'H' | 'W') {
            continue;
        }
        let digit = soundex_digit(letter);
        if let Some(d) = digit {
            if digit != previous {
                code.push(d);
            }
        }
        previous = digit;
    }

    while code.len() < 4 {
        code.push('0');
    }
    Some(SoundexCode(code))
}

fn soundex_digit(letter: char) -> Option<char> {
    match letter {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

/// Normalised lowercase name token used for exact and substring name matching.
pub fn name_search_token(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Comparison keys derived from one patient record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchKeys<'a> {
    pub first_name_token: String,
    pub last_name_token: String,
    pub first_name_soundex: Option<SoundexCode>,
    pub last_name_soundex: Option<SoundexCode>,
    pub birth_year: i32,
    pub phone_digits: Option<&'a str>,
}

impl<'a> MatchKeys<'a> {
    pub fn from_record(record: &'a PatientRecord) -> Self {
        Self {
            first_name_token: name_search_token(record.first_name.as_str()),
            last_name_token: name_search_token(record.last_name.as_str()),
            first_name_soundex: soundex(record.first_name.as_str()),
            last_name_soundex: soundex(record.last_name.as_str()),
            birth_year: record.birth_year(),
            phone_digits: record.phone_number.as_ref().map(|p| p.digits()),
        }
    }

    /// Both records carry a phone number and the digits are identical.
    pub fn same_phone(&self, other: &MatchKeys<'_>) -> bool {
        matches!((self.phone_digits, other.phone_digits), (Some(a), Some(b)) if a == b)
    }

    /// First and last names share a Soundex code. Missing codes never match.
    pub fn sounds_alike(&self, other: &MatchKeys<'_>) -> bool {
        codes_match(&self.first_name_soundex, &other.first_name_soundex)
            && codes_match(&self.last_name_soundex, &other.last_name_soundex)
    }

    /// First and last names are identical ignoring case and surrounding whitespace.
    pub fn same_name(&self, other: &MatchKeys<'_>) -> bool {
        self.first_name_token == other.first_name_token
            && self.last_name_token == other.last_name_token
    }

    pub fn same_birth_year(&self, other: &MatchKeys<'_>) -> bool {
        self.birth_year == other.birth_year
    }
}

fn codes_match(a: &Option<SoundexCode>, b: &Option<SoundexCode>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}
