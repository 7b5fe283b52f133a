//! Operator input validation.

use shared_types::{parse_units, ParseError, U256};

use super::errors::ValidationError;

/// Longest coverage period, in days.
pub const MAX_DURATION_DAYS: u64 = 365;

/// Parse a token amount into 18-decimal base units.
///
/// # Errors
///
/// `Amount` unless the input is a non-negative decimal with at most 18
/// fractional digits.
pub fn parse_amount(input: &str) -> Result<U256, ValidationError> {
    parse_units(input).map_err(|err| match err {
        ParseError::InvalidAmount { input, reason } => ValidationError::Amount { input, reason },
        other => ValidationError::Amount {
            input: input.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Parse a coverage duration in whole days.
///
/// # Errors
///
/// `Duration` unless the input is an integer in `1..=365`.
pub fn parse_days(input: &str) -> Result<u64, ValidationError> {
    let text = input.trim();
    match text.parse::<u64>() {
        Ok(days) if (1..=MAX_DURATION_DAYS).contains(&days) => Ok(days),
        _ => Err(ValidationError::Duration(text.to_string())),
    }
}

/// Parse a certificate or policy id.
///
/// # Errors
///
/// `Id` unless the input is a non-negative integer.
pub fn parse_id(input: &str) -> Result<u64, ValidationError> {
    let text = input.trim();
    text.parse::<u64>()
        .map_err(|_| ValidationError::Id(text.to_string()))
}
