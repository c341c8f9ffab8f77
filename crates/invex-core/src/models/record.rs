//! Flat invoice record handed to the persistence collaborator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::extraction::{ExtractionStatus, InvoiceExtractionResult};
use super::pattern::FieldCategory;

/// Extraction result mapped onto persisted invoice columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    pub status: ExtractionStatus,

    pub confidence: f32,

    /// Audit: comma-delimited winning pattern ids.
    pub used_pattern_ids: String,

    /// Audit: one line per category.
    pub match_summary: String,

    /// Audit: per-field and overall confidences.
    pub confidence_detail: String,
}

impl From<&InvoiceExtractionResult> for InvoiceRecord {
    fn from(result: &InvoiceExtractionResult) -> Self {
        let text = |category| result.text(category).map(str::to_string);

        Self {
            invoice_number: text(FieldCategory::InvoiceNumber),
            vendor_name: text(FieldCategory::Vendor),
            vendor_address: text(FieldCategory::Address),
            invoice_date: result.date(FieldCategory::Date),
            due_date: result.date(FieldCategory::DueDate),
            total_amount: result.amount(FieldCategory::Amount),
            tax_amount: result.amount(FieldCategory::TaxAmount),
            subtotal_amount: result.amount(FieldCategory::SubtotalAmount),
            currency: text(FieldCategory::Currency),
            status: result.status,
            confidence: result.overall_confidence,
            used_pattern_ids: result.used_pattern_ids_text(),
            match_summary: result.pattern_match_summary.clone(),
            confidence_detail: result.confidence_detail(),
        }
    }
}

impl InvoiceRecord {
    /// Names of the columns that stayed empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number.is_none() {
            missing.push("invoice_number");
        }
        if self.vendor_name.is_none() {
            missing.push("vendor_name");
        }
        if self.invoice_date.is_none() {
            missing.push("invoice_date");
        }
        if self.total_amount.is_none() {
            missing.push("total_amount");
        }
        missing
    }
}
