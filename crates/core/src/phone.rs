//! Phone number normalization.
//!
//! The auth transport consumes E.164 numbers. User input arrives with
//! formatting punctuation and usually without a country code; bare
//! ten-digit numbers are treated as US/Canada.

use crate::error::CoreError;

/// Minimum digits in an E.164 number (country code included).
const MIN_DIGITS: usize = 8;

/// Maximum digits in an E.164 number.
const MAX_DIGITS: usize = 15;

/// Normalize user input to E.164.
///
/// Accepts formatting characters (spaces, dashes, dots, parentheses) and an
/// optional leading `+`. A bare 10-digit number is prefixed with `+1`; an
/// 11-digit number starting with `1` likewise.
pub fn normalize_e164(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    let has_plus = trimmed.starts_with('+');

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed
        .chars()
        .any(|c| !c.is_ascii_digit() && !matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'))
    {
        return Err(CoreError::Validation(format!(
            "Phone number '{trimmed}' contains invalid characters"
        )));
    }

    let normalized = if has_plus {
        digits.clone()
    } else if digits.len() == 10 {
        format!("1{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        digits.clone()
    } else {
        digits.clone()
    };

    if normalized.len() < MIN_DIGITS || normalized.len() > MAX_DIGITS {
        return Err(CoreError::Validation(format!(
            "Phone number '{trimmed}' must have between {MIN_DIGITS} and {MAX_DIGITS} digits"
        )));
    }

    Ok(format!("+{normalized}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ten_digits_get_us_country_code() {
        assert_eq!(normalize_e164("7135551234").unwrap(), "+17135551234");
    }

    #[test]
    fn formatting_punctuation_is_stripped() {
        assert_eq!(normalize_e164("(713) 555-1234").unwrap(), "+17135551234");
        assert_eq!(normalize_e164("713.555.1234").unwrap(), "+17135551234");
    }

    #[test]
    fn eleven_digits_with_leading_one_pass_through() {
        assert_eq!(normalize_e164("17135551234").unwrap(), "+17135551234");
    }

    #[test]
    fn explicit_plus_is_preserved() {
        assert_eq!(normalize_e164("+447911123456").unwrap(), "+447911123456");
    }

    #[test]
    fn letters_are_rejected() {
        assert!(normalize_e164("713-CALL-NOW").is_err());
    }

    #[test]
    fn too_short_or_too_long_is_rejected() {
        assert!(normalize_e164("12345").is_err());
        assert!(normalize_e164("+12345678901234567").is_err());
    }
}
