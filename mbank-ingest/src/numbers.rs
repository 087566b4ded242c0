//! Numeric fields in mBank exports use a space as thousands separator and a
//! comma as decimal separator: `-1 234,56`.

use crate::error::{IngestError, Result};

/// Parse a transaction amount such as `-1 234,56`.
pub fn parse_amount(text: &str) -> Result<f64> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    to_f64(&cleaned.replace(',', "."), text)
}

/// Parse a balance cell such as `12.345,67 CZK`.
///
/// Spaces, periods and letters are dropped before the comma is read as the
/// decimal point.
pub fn parse_balance(text: &str) -> Result<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == '.' || c.is_ascii_alphabetic()))
        .collect();
    to_f64(&cleaned.replace(',', "."), text)
}

fn to_f64(cleaned: &str, original: &str) -> Result<f64> {
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(IngestError::Number(original.to_string())),
    }
}
