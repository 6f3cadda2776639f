//! Validation shared by budget and expense names.

use crate::Error;

/// The maximum number of characters in a budget or expense name.
pub const MAX_NAME_LENGTH: usize = 25;

/// Trim `name` and check it has between 1 and [MAX_NAME_LENGTH] characters.
///
/// # Errors
///
/// Returns [Error::EmptyName] or [Error::NameTooLong].
pub fn validate_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        Err(Error::EmptyName)
    } else if name.chars().count() > MAX_NAME_LENGTH {
        Err(Error::NameTooLong(MAX_NAME_LENGTH))
    } else {
        Ok(name.to_owned())
    }
}

/// Check `amount` is a finite number.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] for NaN or infinite values.
pub fn validate_finite(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount)
    }
}

#[cfg(test)]
mod name_tests {
    use crate::{
        Error,
        name::{MAX_NAME_LENGTH, validate_finite, validate_name},
    };

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_name("  Groceries \n"), Ok("Groceries".to_owned()));
    }

    #[test]
    fn whitespace_only_name_is_empty() {
        assert_eq!(validate_name("\n\t \r"), Err(Error::EmptyName));
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let name = "🔥".repeat(MAX_NAME_LENGTH);

        assert_eq!(validate_name(&name), Ok(name.clone()));
        assert_eq!(
            validate_name(&format!("{name}!")),
            Err(Error::NameTooLong(MAX_NAME_LENGTH))
        );
    }

    #[test]
    fn nan_is_not_a_valid_amount() {
        assert_eq!(validate_finite(f64::NAN), Err(Error::InvalidAmount));
        assert_eq!(validate_finite(f64::INFINITY), Err(Error::InvalidAmount));
        assert_eq!(validate_finite(12.5), Ok(12.5));
    }
}
