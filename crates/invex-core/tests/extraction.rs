use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use invex_core::{
    ExtractionConfig, ExtractionOrchestrator, ExtractionStatus, FieldCategory, FieldStatus,
    InvoiceExtractor, InvoiceRecord, PatternDefinition, PatternLibrary, SourceText,
};

const SAMPLE_INVOICE: &str = "\
Acme Widgets Inc.
From: Acme Widgets Inc.
Address: 12 Main Street, Springfield
Invoice Number: INV-1001
Invoice Date: January 25, 2016
Due Date: February 24, 2016

Subtotal: $86.50
Tax (8%): $7.00
Total Due $93.50
Currency: USD
";

fn config(categories: &[FieldCategory], required: &[FieldCategory]) -> ExtractionConfig {
    ExtractionConfig {
        categories: categories.to_vec(),
        required_categories: required.to_vec(),
        ..Default::default()
    }
}

fn orchestrator(defs: Vec<PatternDefinition>, config: ExtractionConfig) -> ExtractionOrchestrator {
    ExtractionOrchestrator::new(Arc::new(PatternLibrary::from_definitions(defs).unwrap()), config)
}

fn total_due_pattern() -> PatternDefinition {
    PatternDefinition::new(
        10,
        "total-due",
        FieldCategory::Amount,
        r"total due\s*([$€£]?\s*\d[\d,]*\.\d{2})",
    )
    .with_priority(10)
    .with_weight(1.0)
}

#[test]
fn amount_scenario_applies_unvalidated_penalty() {
    let orch = orchestrator(
        vec![total_due_pattern()],
        config(&[FieldCategory::Amount], &[FieldCategory::Amount]),
    );

    let result = orch.extract_from_text("Invoice 77\nTotal Due $93.50\nThank you");
    let amount = result.field(FieldCategory::Amount).unwrap();

    assert_eq!(amount.status, FieldStatus::Resolved);
    assert_eq!(result.amount(FieldCategory::Amount), Some(Decimal::from_str("93.50").unwrap()));
    assert!((amount.field_confidence - 0.7).abs() < 1e-6);
    assert_eq!(amount.pattern_id, Some(10));
    assert_eq!(result.status, ExtractionStatus::Complete);
}

#[test]
fn date_scenario_parses_and_falls_through() {
    let defs = vec![
        PatternDefinition::new(20, "date-us", FieldCategory::Date, r"dated\s+([^\n]+)")
            .with_priority(1)
            .with_date_format("MM/dd/yyyy"),
        PatternDefinition::new(21, "date-long", FieldCategory::Date, r"dated\s+([^\n]+)")
            .with_priority(2)
            .with_date_format("MMMM d, yyyy"),
    ];
    let orch = orchestrator(defs, config(&[FieldCategory::Date], &[FieldCategory::Date]));

    let result = orch.extract_from_text("Dated January 25, 2016");
    assert_eq!(
        result.date(FieldCategory::Date),
        Some(NaiveDate::from_ymd_opt(2016, 1, 25).unwrap())
    );
    assert_eq!(result.used_pattern_ids, vec![21]);

    let unparsable = orch.extract_from_text("Dated the twenty-fifth");
    let date = unparsable.field(FieldCategory::Date).unwrap();
    assert_eq!(date.status, FieldStatus::RejectedByValidation);
    assert_eq!(date.value, None);
    assert_eq!(unparsable.status, ExtractionStatus::Failed);
}

#[test]
fn missing_vendor_is_partial_or_failed() {
    let defs = vec![
        total_due_pattern(),
        PatternDefinition::new(30, "vendor-from", FieldCategory::Vendor, r"from:\s*([^\n]+)")
            .with_priority(100),
    ];
    let required = [FieldCategory::Amount, FieldCategory::Vendor];
    let orch = orchestrator(defs, config(&required, &required));

    let partial = orch.extract_from_text("Total Due $12.00");
    assert_eq!(partial.field(FieldCategory::Vendor).unwrap().status, FieldStatus::Unresolved);
    assert_eq!(partial.status, ExtractionStatus::Partial);

    let failed = orch.extract_from_text("Nothing useful here");
    assert_eq!(failed.status, ExtractionStatus::Failed);
    assert_eq!(failed.overall_confidence, 0.0);
    assert!(failed.used_pattern_ids.is_empty());
}

#[test]
fn lower_priority_number_always_wins() {
    let defs = vec![
        PatternDefinition::new(2, "b-better-capture", FieldCategory::Vendor, r"vendor:\s*([^\n]+)")
            .with_priority(20)
            .with_weight(1.0)
            .with_validation(r"\w"),
        PatternDefinition::new(1, "a-first-word", FieldCategory::Vendor, r"vendor:\s*(\w+)")
            .with_priority(10)
            .with_weight(0.3),
    ];
    let orch = orchestrator(defs, config(&[FieldCategory::Vendor], &[FieldCategory::Vendor]));

    let result = orch.extract_from_text("Vendor: Globex Corporation");
    assert_eq!(result.text(FieldCategory::Vendor), Some("Globex"));
    assert_eq!(result.used_pattern_ids, vec![1]);
}

#[test]
fn malformed_pattern_is_isolated() {
    let defs = vec![
        PatternDefinition::new(1, "broken", FieldCategory::Amount, r"total due (\d+").with_priority(1),
        total_due_pattern(),
    ];
    let orch = orchestrator(defs, config(&[FieldCategory::Amount], &[FieldCategory::Amount]));

    let result = orch.extract_from_text("Total Due $93.50");
    assert_eq!(result.status, ExtractionStatus::Complete);
    assert_eq!(result.used_pattern_ids, vec![10]);
    assert_eq!(result.invalid_patterns.len(), 1);
    assert_eq!(result.invalid_patterns[0].pattern_id, 1);
}

#[test]
fn empty_library_fails() {
    let orch = ExtractionOrchestrator::new(Arc::new(PatternLibrary::empty()), ExtractionConfig::default());
    let result = orch.extract_from_text(SAMPLE_INVOICE);

    assert_eq!(result.status, ExtractionStatus::Failed);
    assert!(result.fields.iter().all(|f| f.status == FieldStatus::Unresolved));
}

#[test]
fn builtin_library_extracts_sample_invoice() {
    let orch = ExtractionOrchestrator::new(Arc::new(PatternLibrary::builtin()), ExtractionConfig::default());
    let result = orch.extract(&SourceText::new(SAMPLE_INVOICE).with_confidence(0.98));

    assert_eq!(result.status, ExtractionStatus::Complete);

    let record = InvoiceRecord::from(&result);
    assert_eq!(record.invoice_number.as_deref(), Some("INV-1001"));
    assert_eq!(record.vendor_name.as_deref(), Some("Acme Widgets Inc"));
    assert_eq!(record.vendor_address.as_deref(), Some("12 Main Street, Springfield"));
    assert_eq!(record.invoice_date, NaiveDate::from_ymd_opt(2016, 1, 25));
    assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2016, 2, 24));
    assert_eq!(record.total_amount, Some(Decimal::from_str("93.50").unwrap()));
    assert_eq!(record.subtotal_amount, Some(Decimal::from_str("86.50").unwrap()));
    assert_eq!(record.tax_amount, Some(Decimal::from_str("7.00").unwrap()));
    assert_eq!(record.currency.as_deref(), Some("USD"));
    assert!(record.missing_fields().is_empty());
    assert_eq!(record.used_pattern_ids, "1,10,20,30,40,50,80,60,70");
    assert_eq!(record.match_summary.lines().count(), FieldCategory::ALL.len());
}

#[test]
fn confidences_stay_in_bounds() {
    let orch = ExtractionOrchestrator::new(Arc::new(PatternLibrary::builtin()), ExtractionConfig::default());

    for text in [SAMPLE_INVOICE, "Total: $5.00", "", "garbage ### 1/1/1"] {
        let result = orch.extract_from_text(text);
        assert!((0.0..=1.0).contains(&result.overall_confidence));
        for field in &result.fields {
            assert!((0.0..=1.0).contains(&field.field_confidence));
        }
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let orch = ExtractionOrchestrator::new(Arc::new(PatternLibrary::builtin()), ExtractionConfig::default());

    let first = serde_json::to_string(&orch.extract_from_text(SAMPLE_INVOICE)).unwrap();
    let second = serde_json::to_string(&orch.extract_from_text(SAMPLE_INVOICE)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_runs_do_not_lose_usage_counts() {
    let library = Arc::new(PatternLibrary::from_definitions(vec![total_due_pattern()]).unwrap());
    let orch = ExtractionOrchestrator::new(
        Arc::clone(&library),
        config(&[FieldCategory::Amount], &[FieldCategory::Amount]),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orch = orch.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let result = orch.extract_from_text("Total Due $93.50");
                    assert_eq!(result.status, ExtractionStatus::Complete);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(library.usage_count(10), Some(400));
    assert!(library.last_used_at(10).is_some());

    let deltas = library.drain_usage();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].uses, 400);
    assert!(library.drain_usage().is_empty());
}

#[test]
fn retired_pattern_never_wins_even_when_listed() {
    let defs = vec![
        PatternDefinition::new(1, "retired-total", FieldCategory::Amount, r"total\s*(\d+\.\d{2})")
            .with_priority(1)
            .with_active(false),
        PatternDefinition::new(2, "due", FieldCategory::Amount, r"due\s*(\d+\.\d{2})").with_priority(2),
    ];
    let library = Arc::new(PatternLibrary::build(defs, true).unwrap());
    let orch = ExtractionOrchestrator::new(
        Arc::clone(&library),
        config(&[FieldCategory::Amount], &[FieldCategory::Amount]),
    );

    let result = orch.extract_from_text("Total 1.00 due 2.00");
    assert_eq!(result.used_pattern_ids, vec![2]);
    assert_eq!(result.amount(FieldCategory::Amount), Some(Decimal::from_str("2.00").unwrap()));
    assert_eq!(library.inactive_patterns().len(), 1);
    assert_eq!(library.usage_count(2), Some(1));
}
