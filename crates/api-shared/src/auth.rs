/// Header carrying the API key on every authenticated request.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing x-api-key header")]
    Missing,
    #[error("Invalid API key")]
    Invalid,
}

/// Resolve the configured API key from the raw `API_KEY` value. Blank values mean auth is off.
pub fn api_key_from_env_value(value: Option<String>) -> Option<String> {
    value.filter(|k| !k.trim().is_empty())
}

/// Validates the provided API key against the key resolved at startup.
///
/// Returns `Ok(())` if the key is valid, or an error if invalid or missing.
pub fn validate_api_key(provided_key: Option<&str>, expected_key: &str) -> Result<(), AuthError> {
    match provided_key {
        None => Err(AuthError::Missing),
        Some(key) if key == expected_key => Ok(()),
        Some(_) => Err(AuthError::Invalid),
    }
}
