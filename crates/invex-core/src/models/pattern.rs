//! Pattern definitions as supplied by the pattern administration store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invoice field group that a set of patterns compete to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldCategory {
    /// Invoice identifier.
    InvoiceNumber,
    /// Total amount due.
    Amount,
    /// Tax amount.
    TaxAmount,
    /// Amount before tax.
    SubtotalAmount,
    /// Invoice date.
    Date,
    /// Payment due date.
    DueDate,
    /// Vendor (issuer) name.
    Vendor,
    /// Vendor address.
    Address,
    /// Currency code.
    Currency,
}

impl FieldCategory {
    /// Every category, in default processing order.
    pub const ALL: [FieldCategory; 9] = [
        FieldCategory::InvoiceNumber,
        FieldCategory::Amount,
        FieldCategory::SubtotalAmount,
        FieldCategory::TaxAmount,
        FieldCategory::Date,
        FieldCategory::DueDate,
        FieldCategory::Currency,
        FieldCategory::Vendor,
        FieldCategory::Address,
    ];

    /// Stable upper-case name, as used in audit text.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::InvoiceNumber => "INVOICE_NUMBER",
            FieldCategory::Amount => "AMOUNT",
            FieldCategory::TaxAmount => "TAX_AMOUNT",
            FieldCategory::SubtotalAmount => "SUBTOTAL_AMOUNT",
            FieldCategory::Date => "DATE",
            FieldCategory::DueDate => "DUE_DATE",
            FieldCategory::Vendor => "VENDOR",
            FieldCategory::Address => "ADDRESS",
            FieldCategory::Currency => "CURRENCY",
        }
    }

    /// Parse a category name (case-insensitive, `-` accepted for `_`).
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|c| c.as_str() == wanted)
    }

    /// Whether values of this category are calendar dates.
    pub fn is_date(&self) -> bool {
        matches!(self, FieldCategory::Date | FieldCategory::DueDate)
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

fn default_capture_group() -> usize {
    1
}

/// A named, prioritized, weighted text-matching rule scoped to one category.
///
/// `priority` and `confidence_weight` are owned by the administration store.
/// Extraction only ever reads them; usage statistics flow back through the
/// library's usage ledger rather than through this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// Unique pattern id.
    pub id: u64,

    /// Human-readable name.
    pub name: String,

    /// Field category this pattern fills.
    pub category: FieldCategory,

    /// Regular expression text.
    pub expression: String,

    /// Match case-sensitively (default: case-insensitive).
    #[serde(default)]
    pub case_sensitive: bool,

    /// Let `^` and `$` match at line boundaries.
    #[serde(default)]
    pub multiline: bool,

    /// Lower value is tried earlier; ties broken by ascending id.
    pub priority: i32,

    /// Trust in this pattern, in (0.0, 1.0].
    pub confidence_weight: f32,

    /// Inactive patterns are left out of snapshots.
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Date format such as `MMMM d, yyyy` (date categories only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    /// Capture group holding the value (0 = whole match).
    #[serde(default = "default_capture_group")]
    pub capture_group: usize,

    /// Expression the normalized value must additionally satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_expression: Option<String>,

    /// Number of times this pattern has won its category.
    #[serde(default)]
    pub usage_count: u64,

    /// Last time this pattern won its category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PatternDefinition {
    /// Create an active pattern with priority 100 and weight 1.0.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: FieldCategory,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            expression: expression.into(),
            case_sensitive: false,
            multiline: false,
            priority: 100,
            confidence_weight: 1.0,
            is_active: true,
            date_format: None,
            capture_group: 1,
            validation_expression: None,
            usage_count: 0,
            last_used_at: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.confidence_weight = weight;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_validation(mut self, expression: impl Into<String>) -> Self {
        self.validation_expression = Some(expression.into());
        self
    }

    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = group;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_parse() {
        assert_eq!(FieldCategory::parse("amount"), Some(FieldCategory::Amount));
        assert_eq!(FieldCategory::parse("due-date"), Some(FieldCategory::DueDate));
        assert_eq!(FieldCategory::parse("TAX_AMOUNT"), Some(FieldCategory::TaxAmount));
        assert_eq!(FieldCategory::parse("colour"), None);
    }

    #[test]
    fn test_category_serde_name() {
        let json = serde_json::to_string(&FieldCategory::InvoiceNumber).unwrap();
        assert_eq!(json, "\"INVOICE_NUMBER\"");
    }

    #[test]
    fn test_definition_defaults_from_json() {
        let json = r#"{
            "id": 7,
            "name": "total-due",
            "category": "AMOUNT",
            "expression": "total due\\s*(\\S+)",
            "priority": 10,
            "confidence_weight": 0.9
        }"#;

        let def: PatternDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.capture_group, 1);
        assert!(def.is_active);
        assert!(!def.case_sensitive);
        assert_eq!(def.usage_count, 0);
        assert_eq!(def.date_format, None);
    }

    #[test]
    fn test_definition_missing_required_field() {
        let json = r#"{ "id": 7, "name": "x", "category": "AMOUNT", "expression": "x" }"#;
        assert!(serde_json::from_str::<PatternDefinition>(json).is_err());
    }
}
