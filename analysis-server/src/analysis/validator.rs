//! Analysis parameter validation
//!
//! Validation never errors: it returns a [`ValidationResult`] and the caller
//! decides how to surface it (the HTTP layer maps it to 400).

use shared::models::ValidationResult;

use crate::utils::time::parse_date;

pub const MSG_DATES_REQUIRED: &str = "The start date and end date cannot be left blank";
pub const MSG_INVALID_DATE: &str = "Invalid date format. Please use the YYYY-MM-DD format.";
pub const MSG_START_AFTER_END: &str = "The start date cannot be later than the end date.";

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Full validation used before any computation: presence, format, ordering.
///
/// Partner/product filters are free-form and need no checks here.
pub fn validate_analysis_params(start_date: Option<&str>, end_date: Option<&str>) -> ValidationResult {
    let (Some(start), Some(end)) = (present(start_date), present(end_date)) else {
        return ValidationResult::invalid(MSG_DATES_REQUIRED);
    };

    let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
        return ValidationResult::invalid(MSG_INVALID_DATE);
    };

    if start > end {
        return ValidationResult::invalid(MSG_START_AFTER_END);
    }

    ValidationResult::valid()
}

/// Looser check for read endpoints: both dates present
pub fn validate_basic_params(start_date: Option<&str>, end_date: Option<&str>) -> ValidationResult {
    match (present(start_date), present(end_date)) {
        (Some(_), Some(_)) => ValidationResult::valid(),
        _ => ValidationResult::invalid(MSG_DATES_REQUIRED),
    }
}
