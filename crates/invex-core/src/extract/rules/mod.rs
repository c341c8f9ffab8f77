//! Per-category normalization of captured text.

pub mod amounts;
pub mod dates;
pub mod text;

pub use amounts::parse_amount;
pub use dates::{parse_date, translate_format};
pub use text::{clean_invoice_number, clean_name, parse_currency};

use crate::error::NormalizeError;
use crate::models::extraction::FieldValue;
use crate::models::pattern::FieldCategory;

/// Turn a raw capture into the typed value for `category`.
///
/// `date_format` is consulted for date categories only.
pub fn normalize(
    category: FieldCategory,
    raw: &str,
    date_format: Option<&str>,
) -> Result<FieldValue, NormalizeError> {
    match category {
        FieldCategory::Amount | FieldCategory::TaxAmount | FieldCategory::SubtotalAmount => {
            parse_amount(raw).map(FieldValue::Amount)
        }
        FieldCategory::Date | FieldCategory::DueDate => match date_format {
            Some(format) => parse_date(raw, format).map(FieldValue::Date),
            None => Err(NormalizeError::InvalidDate {
                value: raw.trim().to_string(),
                format: String::new(),
            }),
        },
        FieldCategory::Vendor | FieldCategory::Address => clean_name(raw).map(FieldValue::Text),
        FieldCategory::InvoiceNumber => clean_invoice_number(raw).map(FieldValue::Text),
        FieldCategory::Currency => parse_currency(raw).map(FieldValue::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_normalize_dispatch() {
        assert_eq!(
            normalize(FieldCategory::TaxAmount, "$7.25", None),
            Ok(FieldValue::Amount(Decimal::new(725, 2)))
        );
        assert_eq!(
            normalize(FieldCategory::DueDate, "2024-02-01", Some("yyyy-MM-dd")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
        );
        assert_eq!(
            normalize(FieldCategory::Vendor, " Acme  Corp. ", None),
            Ok(FieldValue::Text("Acme Corp".to_string()))
        );
    }

    #[test]
    fn test_date_without_format_rejected() {
        assert!(normalize(FieldCategory::Date, "2024-02-01", None).is_err());
    }
}
