//! Reusable validators for `#[validate(custom(function = ...))]`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Digits with optional leading `+` and common separators.
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9(][0-9 ()\-]{5,23}[0-9]$").unwrap();
}

/// Validates a phone number such as `+421 905 123 456` or `(555) 010-2030`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone must contain 7 to 25 digits and separators".into());
        Err(err)
    }
}

/// Rejects strings that are empty after trimming whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Lowercases and trims an email address before storage or lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_accepts_common_formats() {
        assert!(validate_phone("+421905123456").is_ok());
        assert!(validate_phone("+421 905 123 456").is_ok());
        assert!(validate_phone("(555) 010-2030").is_ok());
        assert!(validate_phone("555-010-2030").is_ok());
        assert!(validate_phone(" 0905123456 ").is_ok());
    }

    #[test]
    fn test_validate_phone_rejects_garbage() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me maybe").is_err());
        assert!(validate_phone("+421905123456-").is_err());
    }

    #[test]
    fn test_validate_phone_error_message() {
        let err = validate_phone("abc").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Phone must contain 7 to 25 digits and separators"
        );
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Main Street School").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jana.Novak@Example.COM "), "jana.novak@example.com");
    }
}
