//! Amount normalization (AMOUNT, TAX_AMOUNT, SUBTOTAL_AMOUNT).

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::NormalizeError;
use crate::extract::patterns::{CURRENCY_MARKS, NEGATIVE_AMOUNT};

/// Parse a captured amount such as `$1,234.56`, `1.234,56 EUR` or `93.50`.
///
/// Accepts only non-negative values with at most two fractional digits.
pub fn parse_amount(raw: &str) -> Result<Decimal, NormalizeError> {
    let stripped = CURRENCY_MARKS.replace_all(raw, "");

    if NEGATIVE_AMOUNT.is_match(&stripped) {
        return Err(NormalizeError::NegativeAmount(raw.trim().to_string()));
    }

    // Remove spaces, non-breaking spaces and apostrophe grouping (1'234.00)
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    if cleaned.is_empty() {
        return Err(NormalizeError::Empty);
    }

    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        || !cleaned.chars().any(|c| c.is_ascii_digit())
    {
        return Err(NormalizeError::InvalidAmount(raw.trim().to_string()));
    }

    let normalized = normalize_separators(&cleaned);
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| NormalizeError::InvalidAmount(raw.trim().to_string()))?;

    if amount.scale() > 2 {
        return Err(NormalizeError::TooManyFractionDigits(raw.trim().to_string()));
    }

    Ok(amount)
}

/// Rewrite grouping and decimal separators into plain `1234.56` form.
fn normalize_separators(cleaned: &str) -> String {
    let comma_pos = cleaned.rfind(',');
    let dot_pos = cleaned.rfind('.');

    match (comma_pos, dot_pos) {
        // Both present: the rightmost one is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Commas only: thousands grouping when the groups are well formed, else a decimal comma
        (Some(_), None) if is_comma_grouping(cleaned) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned.to_string(),
    }
}

/// `1,234` or `12,345,678`: a leading group of 1-3 digits without a leading
/// zero, then groups of exactly three.
fn is_comma_grouping(cleaned: &str) -> bool {
    let mut groups = cleaned.split(',');
    let leading = groups.next().unwrap_or("");

    (1..=3).contains(&leading.len())
        && !leading.starts_with('0')
        && groups.all(|g| g.len() == 3)
}
