//! Text normalization: VENDOR, ADDRESS, INVOICE_NUMBER and CURRENCY.

use crate::error::NormalizeError;
use crate::extract::patterns::{CURRENCY_CODE, WHITESPACE_RUN};

/// Minimum length of an invoice number after trimming.
pub const MIN_INVOICE_NUMBER_LEN: usize = 3;

/// Trim surrounding whitespace and punctuation and collapse inner whitespace.
pub fn clean_name(raw: &str) -> Result<String, NormalizeError> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    let collapsed = WHITESPACE_RUN.replace_all(trimmed, " ");

    if collapsed.is_empty() {
        return Err(NormalizeError::Empty);
    }
    Ok(collapsed.into_owned())
}

/// Trim an invoice number and check its length.
pub fn clean_invoice_number(raw: &str) -> Result<String, NormalizeError> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(NormalizeError::Empty);
    }
    if value.chars().count() < MIN_INVOICE_NUMBER_LEN {
        return Err(NormalizeError::TooShort {
            value: value.to_string(),
            min: MIN_INVOICE_NUMBER_LEN,
        });
    }
    Ok(value.to_string())
}

/// Map a currency symbol or code to an upper-case 3-letter code.
pub fn parse_currency(raw: &str) -> Result<String, NormalizeError> {
    let value = raw.trim();

    let code = match value.to_lowercase().as_str() {
        "" => return Err(NormalizeError::Empty),
        "$" | "us$" => "USD",
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        "zł" => "PLN",
        "c$" => "CAD",
        "a$" => "AUD",
        _ if CURRENCY_CODE.is_match(value) => return Ok(value.to_uppercase()),
        _ => return Err(NormalizeError::UnknownCurrency(value.to_string())),
    };

    Ok(code.to_string())
}
