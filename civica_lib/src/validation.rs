//! Input validation for the HTTP surface.
//!
//! Every user-provided value passes through a validator before reaching the
//! dispatch or store layers. Validators return typed results or
//! `CivicaError::InvalidInput`.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::CivicaError;

/// Maximum byte length for free-text search queries.
pub const MAX_QUERY_LENGTH: usize = 300;

/// Maximum number of postal codes accepted by one bulk import.
pub const MAX_IMPORT_POSTALS: usize = 500;

fn postal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{5}$").expect("static regex"))
}

/// Returns true iff the input is exactly five ASCII digits.
pub fn is_postal(input: &str) -> bool {
    postal_re().is_match(input)
}

/// Validate a 5-digit postal code.
pub fn validate_postal(input: &str) -> Result<String, CivicaError> {
    let trimmed = input.trim();
    if is_postal(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(CivicaError::InvalidInput(format!(
            "'{}' is not a 5-digit postal code",
            input
        )))
    }
}

/// Validate an official ID path segment.
pub fn validate_uuid(input: &str) -> Result<Uuid, CivicaError> {
    Uuid::parse_str(input.trim())
        .map_err(|_| CivicaError::InvalidInput(format!("'{}' is not a valid ID", input)))
}

/// Validate a free-text search query: strip control characters, trim,
/// enforce a length limit.
pub fn validate_query(input: &str) -> Result<String, CivicaError> {
    if input.len() > MAX_QUERY_LENGTH {
        return Err(CivicaError::InvalidInput(format!(
            "query exceeds maximum length of {} bytes",
            MAX_QUERY_LENGTH
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(CivicaError::InvalidInput(
            "query is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a bulk-import postal list: non-empty, at most
/// [`MAX_IMPORT_POSTALS`], every entry a 5-digit code.
pub fn validate_import_postals(postals: &[String]) -> Result<Vec<String>, CivicaError> {
    if postals.is_empty() {
        return Err(CivicaError::InvalidInput(
            "postal list is empty".to_string(),
        ));
    }
    if postals.len() > MAX_IMPORT_POSTALS {
        return Err(CivicaError::InvalidInput(format!(
            "postal list exceeds maximum of {} entries",
            MAX_IMPORT_POSTALS
        )));
    }
    postals.iter().map(|p| validate_postal(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_regex_boundaries() {
        assert!(is_postal("00000"));
        assert!(is_postal("99999"));
        assert!(!is_postal("1234"));
        assert!(!is_postal("123456"));
        assert!(!is_postal("1234a"));
        assert!(!is_postal("12345-6789"));
    }

    #[test]
    fn validate_postal_trims() {
        assert_eq!(validate_postal(" 47401 ").unwrap(), "47401");
        assert!(validate_postal("474o1").is_err());
    }

    #[test]
    fn validate_uuid_rejects_garbage() {
        assert!(validate_uuid("not-a-uuid").is_err());
        let id = uuid::Uuid::new_v4();
        assert_eq!(validate_uuid(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn validate_query_sanitizes() {
        assert_eq!(
            validate_query("  1600 Pennsylvania\u{7} Ave  ").unwrap(),
            "1600 Pennsylvania Ave"
        );
        assert!(validate_query("   ").is_err());
        assert!(validate_query(&"x".repeat(MAX_QUERY_LENGTH + 1)).is_err());
    }

    #[test]
    fn import_list_boundary() {
        let exactly_500: Vec<String> = (0..500).map(|i| format!("{:05}", i)).collect();
        assert_eq!(validate_import_postals(&exactly_500).unwrap().len(), 500);

        let too_many: Vec<String> = (0..501).map(|i| format!("{:05}", i)).collect();
        assert!(validate_import_postals(&too_many).is_err());

        assert!(validate_import_postals(&[]).is_err());
        assert!(validate_import_postals(&["abcde".to_string()]).is_err());
    }
}
