//! Validated text primitives shared across the patient service crates.
//!
//! These types carry their validation in the type: once constructed, a
//! [`NonEmptyText`] is trimmed and non-empty, a [`PhoneNumber`] holds the
//! digits-only form used for exact phone comparisons, and an [`EmailAddress`]
//! has a plausible `local@domain` shape.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the allowed number of characters
    #[error("Text must not exceed {max} characters")]
    TooLong { max: usize },
    /// The input contained no digits, so it cannot identify a phone line
    #[error("Phone number must contain digits")]
    NoDigits,
    /// The input is not shaped like `local@domain.tld`
    #[error("Email must be a valid email address")]
    InvalidEmail,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a `NonEmptyText` that is at most `max` characters long after trimming.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::TooLong` when the
    /// trimmed input has more than `max` characters.
    pub fn with_max_len(input: impl AsRef<str>, max: usize) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        if text.0.chars().count() > max {
            return Err(TextError::TooLong { max });
        }
        Ok(text)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number reduced to its digits.
///
/// `(555) 987-1111`, `555.987.1111` and `555-987-1111` all normalise to
/// `5559871111`, so two records entered with different punctuation compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalises `input` to digits only.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::NoDigits` when the
    /// input has no digits at all.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref().trim();
        if input.is_empty() {
            return Err(TextError::Empty);
        }
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(TextError::NoDigits);
        }
        Ok(Self(digits))
    }

    /// Returns the digits-only form.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An email address with a plausible `local@domain.tld` shape.
///
/// This is a syntactic check only; deliverability is not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and trims an email address.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::InvalidEmail` when the
    /// input has whitespace, not exactly one `@`, an empty local part, or a domain without
    /// an inner `.`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref().trim();
        if input.is_empty() {
            return Err(TextError::Empty);
        }
        if input.chars().any(char::is_whitespace) {
            return Err(TextError::InvalidEmail);
        }
        let (local, domain) = input.split_once('@').ok_or(TextError::InvalidEmail)?;
        let domain_ok = !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'));
        if local.is_empty() || !domain_ok {
            return Err(TextError::InvalidEmail);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
