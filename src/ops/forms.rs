//! Local form validation: shape checks performed before any network
//! traffic. Failures are rendered inline and never reach the token
//! validator.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("enter a valid amount")]
    InvalidAmount,
    #[error("enter a valid phone number")]
    InvalidPhone,
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("{0} is required")]
    Required(&'static str),
}

/// Positive decimal with at most two fraction digits.
///
/// # Errors
/// Returns `InvalidAmount` for zero, negative or malformed input.
pub fn amount(raw: &str) -> Result<(), FormError> {
    let raw = raw.trim();
    let shape_ok =
        Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").map_or(false, |re| re.is_match(raw));
    if !shape_ok {
        return Err(FormError::InvalidAmount);
    }
    match raw.parse::<f64>() {
        Ok(value) if value > 0.0 => Ok(()),
        _ => Err(FormError::InvalidAmount),
    }
}

/// 7 to 15 digits with an optional leading `+`.
///
/// # Errors
/// Returns `InvalidPhone` on malformed input.
pub fn phone(raw: &str) -> Result<(), FormError> {
    let ok = Regex::new(r"^\+?[0-9]{7,15}$").map_or(false, |re| re.is_match(raw.trim()));
    if ok {
        Ok(())
    } else {
        Err(FormError::InvalidPhone)
    }
}

/// Minimal email shape check; the server performs the authoritative one.
///
/// # Errors
/// Returns `InvalidEmail` on malformed input.
pub fn email(raw: &str) -> Result<(), FormError> {
    let ok = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(raw.trim()));
    if ok {
        Ok(())
    } else {
        Err(FormError::InvalidEmail)
    }
}

/// Exactly 4 ASCII digits.
///
/// # Errors
/// Returns `InvalidPin` on malformed input.
pub fn pin(raw: &str) -> Result<(), FormError> {
    let raw = raw.trim();
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FormError::InvalidPin)
    }
}

/// Non-empty required selection.
///
/// # Errors
/// Returns `Required(name)` if the value is blank.
pub fn required(name: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Required(name))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert!(amount("100").is_ok());
        assert!(amount("0.50").is_ok());
        assert!(amount("12.3").is_ok());
        assert_eq!(amount("0"), Err(FormError::InvalidAmount));
        assert_eq!(amount("0.00"), Err(FormError::InvalidAmount));
        assert_eq!(amount("-5"), Err(FormError::InvalidAmount));
        assert_eq!(amount("1.234"), Err(FormError::InvalidAmount));
        assert_eq!(amount("abc"), Err(FormError::InvalidAmount));
        assert_eq!(amount(""), Err(FormError::InvalidAmount));
    }

    #[test]
    fn phones() {
        assert!(phone("+254700000001").is_ok());
        assert!(phone("0712345678").is_ok());
        assert_eq!(phone("12345"), Err(FormError::InvalidPhone));
        assert_eq!(phone("+2547abc"), Err(FormError::InvalidPhone));
    }

    #[test]
    fn emails() {
        assert!(email("a@b.com").is_ok());
        assert_eq!(email("not-an-email"), Err(FormError::InvalidEmail));
        assert_eq!(email("a @b.com"), Err(FormError::InvalidEmail));
    }

    #[test]
    fn pins() {
        assert!(pin("1234").is_ok());
        assert!(pin(" 1234 ").is_ok());
        assert_eq!(pin("123"), Err(FormError::InvalidPin));
        assert_eq!(pin("12345"), Err(FormError::InvalidPin));
        assert_eq!(pin("12a4"), Err(FormError::InvalidPin));
    }

    #[test]
    fn required_fields() {
        assert!(required("biller", "KPLC").is_ok());
        assert_eq!(required("biller", "  "), Err(FormError::Required("biller")));
    }
}
