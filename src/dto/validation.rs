//! Validation helpers for DTOs.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use validator::ValidationError;

const RELEASE_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Validates that a release date is a real calendar date in `YYYY-MM-DD` form.
///
/// # Examples
///
/// ```ignore
/// validate_release_date("2023-05-12") // Ok
/// validate_release_date("12/05/2023") // Err - wrong shape
/// validate_release_date("2023-02-30") // Err - not a calendar date
/// ```
pub fn validate_release_date(raw: &str) -> Result<(), ValidationError> {
    if Date::parse(raw, RELEASE_DATE_FORMAT).is_err() {
        let mut err = ValidationError::new("release_date_format");
        err.message = Some(format!("Release date `{raw}` must be a valid YYYY-MM-DD date").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_release_date_valid() {
        assert!(validate_release_date("2023-05-12").is_ok());
        assert!(validate_release_date("2021-11-09").is_ok());
        assert!(validate_release_date("2024-02-29").is_ok()); // leap day
    }

    #[test]
    fn test_validate_release_date_invalid_shape() {
        assert!(validate_release_date("12/05/2023").is_err());
        assert!(validate_release_date("2023-5-12").is_err()); // unpadded month
        assert!(validate_release_date("2023-05").is_err());
        assert!(validate_release_date("").is_err());
    }

    #[test]
    fn test_validate_release_date_not_a_date() {
        assert!(validate_release_date("2023-02-30").is_err());
        assert!(validate_release_date("2023-13-01").is_err());
    }
}
