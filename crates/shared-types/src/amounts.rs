//! # Decimal Amounts
//!
//! Conversion between human decimal strings ("1.1", "200") and 18-decimal
//! base units. Every numeric init parameter and every console amount goes
//! through here.

use crate::entities::U256;
use crate::errors::ParseError;

/// Fractional digits of every amount.
pub const DECIMALS: usize = 18;

fn invalid(input: &str, reason: &str) -> ParseError {
    ParseError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn one_unit() -> U256 {
    U256::exp10(DECIMALS)
}

/// Parse a non-negative decimal string into base units.
///
/// Accepts `"10"`, `"0.10"`, `"1."` and `".5"`; rejects signs, exponents,
/// more than [`DECIMALS`] fractional digits, and values overflowing `U256`.
pub fn parse_units(input: &str) -> Result<U256, ParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(invalid(input, "empty"));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(input, "no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(input, "not a decimal number"));
    }
    if fraction.len() > DECIMALS {
        return Err(invalid(input, "more than 18 fractional digits"));
    }

    let whole_value = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| invalid(input, "overflow"))?
    };
    let fraction_value = if fraction.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{fraction:0<width$}", width = DECIMALS);
        U256::from_dec_str(&padded).map_err(|_| invalid(input, "overflow"))?
    };

    whole_value
        .checked_mul(one_unit())
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(|| invalid(input, "overflow"))
}

/// Render base units as a decimal string without trailing zeros.
#[must_use]
pub fn format_units(value: U256) -> String {
    let unit = one_unit();
    let whole = value / unit;
    let fraction = value % unit;
    if fraction.is_zero() {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction.to_string(), width = DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
