//! Built-in pattern library for English-language invoices.
//!
//! Used when no administration store is available (e.g. the CLI without
//! `--patterns`). Ids are grouped by category in blocks of ten.

use crate::models::pattern::{FieldCategory, PatternDefinition};

const MONEY: &str = r"((?:[$€£]\s*)?\d[\d,]*(?:\.\d{2})?)";
const LONG_DATE: &str = r"([a-z]+\s+\d{1,2},\s*\d{4})";
const US_DATE: &str = r"(\d{1,2}/\d{1,2}/\d{4})";
const ISO_DATE: &str = r"(\d{4}-\d{2}-\d{2})";
const CANONICAL_AMOUNT: &str = r"^\d+(?:\.\d{1,2})?$";

/// The built-in definitions.
pub fn default_patterns() -> Vec<PatternDefinition> {
    use FieldCategory::*;

    vec![
        // Invoice number
        PatternDefinition::new(
            1,
            "invoice-number-labeled",
            InvoiceNumber,
            r"invoice\s*(?:no\.?|number|num\.?|#)\s*[:#]?\s*([a-z0-9][a-z0-9\-/]{2,})",
        )
        .with_priority(10)
        .with_weight(0.95)
        .with_validation(r"^[A-Za-z0-9\-/]+$"),
        PatternDefinition::new(
            2,
            "invoice-number-reference",
            InvoiceNumber,
            r"\b(?:ref(?:erence)?|inv)\s*[#:.]\s*([a-z0-9][a-z0-9\-/]{2,})",
        )
        .with_priority(50)
        .with_weight(0.6),
        // Amount
        PatternDefinition::new(
            10,
            "total-due",
            Amount,
            format!(r"(?:total|amount|balance)\s+due\s*:?\s*{}", MONEY),
        )
        .with_priority(10)
        .with_weight(1.0),
        PatternDefinition::new(11, "grand-total", Amount, format!(r"grand\s+total\s*:?\s*{}", MONEY))
            .with_priority(20)
            .with_weight(0.9)
            .with_validation(CANONICAL_AMOUNT),
        PatternDefinition::new(12, "total", Amount, format!(r"\btotal\s*:?\s*{}", MONEY))
            .with_priority(50)
            .with_weight(0.6),
        // Subtotal
        PatternDefinition::new(
            20,
            "subtotal",
            SubtotalAmount,
            format!(r"sub\s*-?\s*total\s*:?\s*{}", MONEY),
        )
        .with_priority(10)
        .with_weight(0.9)
        .with_validation(CANONICAL_AMOUNT),
        // Tax
        PatternDefinition::new(
            30,
            "tax",
            TaxAmount,
            format!(
                r"\b(?:sales\s+tax|vat|gst|tax)(?:\s*\(?\d+(?:\.\d+)?\s*%\)?)?\s*:?\s*{}",
                MONEY
            ),
        )
        .with_priority(10)
        .with_weight(0.85)
        .with_validation(CANONICAL_AMOUNT),
        // Invoice date
        PatternDefinition::new(
            40,
            "invoice-date-long",
            Date,
            format!(r"(?:invoice\s+date|date\s+of\s+issue|issued(?:\s+on)?)\s*:?\s*{}", LONG_DATE),
        )
        .with_priority(10)
        .with_weight(0.95)
        .with_date_format("MMMM d, yyyy"),
        PatternDefinition::new(
            41,
            "invoice-date-us",
            Date,
            format!(r"(?:invoice\s+date|date\s+of\s+issue|issued(?:\s+on)?)\s*:?\s*{}", US_DATE),
        )
        .with_priority(20)
        .with_weight(0.8)
        .with_date_format("MM/dd/yyyy"),
        PatternDefinition::new(
            42,
            "invoice-date-iso",
            Date,
            format!(r"(?:invoice\s+date|date\s+of\s+issue|issued(?:\s+on)?)\s*:?\s*{}", ISO_DATE),
        )
        .with_priority(30)
        .with_weight(0.9)
        .with_date_format("yyyy-MM-dd"),
        PatternDefinition::new(43, "any-long-date", Date, format!(r"\b{}", LONG_DATE))
            .with_priority(90)
            .with_weight(0.5)
            .with_date_format("MMMM d, yyyy"),
        // Due date
        PatternDefinition::new(
            50,
            "due-date-long",
            DueDate,
            format!(r"(?:due\s+date|payment\s+due|due\s+(?:on|by))\s*:?\s*{}", LONG_DATE),
        )
        .with_priority(10)
        .with_weight(0.95)
        .with_date_format("MMMM d, yyyy"),
        PatternDefinition::new(
            51,
            "due-date-us",
            DueDate,
            format!(r"(?:due\s+date|payment\s+due|due\s+(?:on|by))\s*:?\s*{}", US_DATE),
        )
        .with_priority(20)
        .with_weight(0.8)
        .with_date_format("MM/dd/yyyy"),
        PatternDefinition::new(
            52,
            "due-date-iso",
            DueDate,
            format!(r"(?:due\s+date|payment\s+due|due\s+(?:on|by))\s*:?\s*{}", ISO_DATE),
        )
        .with_priority(30)
        .with_weight(0.9)
        .with_date_format("yyyy-MM-dd"),
        // Vendor
        PatternDefinition::new(
            60,
            "vendor-labeled",
            Vendor,
            r"\b(?:from|vendor|supplier|bill\s+from|sold\s+by)\s*:[ \t]*([^\n]+)",
        )
        .with_priority(10)
        .with_weight(0.85),
        PatternDefinition::new(
            61,
            "vendor-company-suffix",
            Vendor,
            r"^[ \t]*([a-z][\w&.,' -]*\b(?:inc|llc|ltd|gmbh|corp|corporation|company|co)\.?)[ \t\r]*$",
        )
        .with_priority(50)
        .with_weight(0.6)
        .with_multiline(true),
        // Address
        PatternDefinition::new(
            70,
            "address-labeled",
            Address,
            r"\b(?:address|remit\s+to)\s*:[ \t]*([^\n]+)",
        )
        .with_priority(10)
        .with_weight(0.8),
        // Currency
        PatternDefinition::new(80, "currency-code", Currency, r"\b(USD|EUR|GBP|CAD|AUD|PLN|CHF|JPY)\b")
            .with_priority(10)
            .with_weight(0.9)
            .with_case_sensitive(true),
        PatternDefinition::new(81, "currency-symbol", Currency, r"([$€£¥])\s*\d")
            .with_priority(50)
            .with_weight(0.6),
    ]
}
