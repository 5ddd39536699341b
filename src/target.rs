//! Establishing the date a run searches for.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

use crate::recognize::{InvalidDate, build_date, parse_exact};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateInputError {
    #[error("no date given")]
    Empty,
    #[error("`{0}` is not a recognized date format (try YYYY-MM-DD)")]
    Unrecognized(String),
    #[error("`{0}` has no year")]
    MissingYear(String),
    #[error("`{input}` is not a valid date: {reason}")]
    Invalid { input: String, reason: InvalidDate },
}

/// The weekday before `today`, stepping back over Saturday and Sunday.
///
/// Public holidays are not considered.
pub fn previous_business_day(today: NaiveDate) -> NaiveDate {
    let mut day = today - Duration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day -= Duration::days(1);
    }
    day
}

/// Parse a user-typed date.
///
/// Accepts the same forms the document scanner recognizes (`2025-10-23`,
/// `2025/10/23`, `2025.10.23`, `20251023`, `10/23/2025`, `10/23/25`,
/// `2025年10月23日`, `114/10/23`, full-width or underscore separators). Inputs without a year are rejected
/// rather than guessed.
pub fn parse_target_date(input: &str, roc_years: bool) -> Result<NaiveDate, DateInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateInputError::Empty);
    }
    let fields = parse_exact(trimmed, roc_years)
        .ok_or_else(|| DateInputError::Unrecognized(trimmed.to_string()))?;
    let year = fields
        .year
        .ok_or_else(|| DateInputError::MissingYear(trimmed.to_string()))?;
    build_date(year, fields.month, fields.day).map_err(|reason| {
        DateInputError::Invalid {
            input: trimmed.to_string(),
            reason,
        }
    })
}
