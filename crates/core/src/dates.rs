//! Date field parsing.

use chrono::NaiveDate;
use domus_common::{AppError, AppResult};

/// Parse a date field from client input.
///
/// Accepts a bare `YYYY-MM-DD` date or a longer timestamp string, in which
/// case only the leading 10 characters are read. Anything that does not
/// start with a calendar date is a validation error.
pub fn parse_date_field(input: &str) -> AppResult<NaiveDate> {
    let prefix: String = input.chars().take(10).collect();

    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {input}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_date() {
        let date = parse_date_field("2025-06-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_parses_timestamp_prefix() {
        let date = parse_date_field("2025-06-01T12:34:56Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_date_field("next tuesday"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_short_input() {
        assert!(matches!(
            parse_date_field("2025-06"),
            Err(AppError::Validation(_))
        ));
    }
}
