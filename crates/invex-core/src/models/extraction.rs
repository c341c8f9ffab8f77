//! Extraction inputs and results.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pattern::FieldCategory;

/// Status reported by the text-extraction collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextStatus {
    /// Embedded PDF text.
    Extracted,
    /// Text recognized by OCR.
    Ocr,
    /// Extraction only partly succeeded.
    Partial,
    /// Unknown origin.
    #[default]
    Unknown,
}

/// Text-extraction metadata, carried through to the result untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Confidence of the text extraction itself (0.0 - 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_confidence: Option<f32>,

    /// How the text was obtained.
    pub text_status: TextStatus,
}

/// Extracted invoice text plus its extraction metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceText {
    pub text: String,
    pub metadata: SourceMetadata,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: SourceMetadata::default(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.metadata.text_confidence = Some(confidence);
        self
    }

    pub fn with_status(mut self, status: TextStatus) -> Self {
        self.metadata.text_status = status;
        self
    }
}

/// Half-open byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether the two ranges share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One match of one pattern against the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Pattern that produced the match.
    pub pattern_id: u64,
    /// Full matched span text.
    pub matched: String,
    /// Text of the configured capture group.
    pub captured: String,
    /// Position of the capture in the source text.
    pub span: Span,
    /// Weight × quality once the candidate has been normalized and validated.
    pub contribution: Option<f32>,
}

impl MatchCandidate {
    pub fn with_contribution(mut self, contribution: f32) -> Self {
        self.contribution = Some(contribution);
        self
    }
}

/// A resolved value, typed per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Amount(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(amount) => Some(*amount),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Canonical text form: `93.50`, `2016-01-25`, or the normalized string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Amount(amount) => write!(f, "{}", amount),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// Resolution outcome of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldStatus {
    /// A pattern produced a value that passed normalization and validation.
    Resolved,
    /// No pattern matched at all.
    Unresolved,
    /// Patterns matched, but every candidate was rejected.
    RejectedByValidation,
}

/// Why a candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The category's normalization refused the capture.
    Normalization { detail: String },
    /// The normalized value failed the pattern's validation expression.
    Validation,
    /// The capture overlaps text already claimed by another category.
    ClaimedSpan,
}

/// A candidate kept for audit after being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub pattern_id: u64,
    pub captured: String,
    pub span: Span,
    pub reason: RejectionReason,
}

impl RejectedCandidate {
    pub fn new(candidate: &MatchCandidate, reason: RejectionReason) -> Self {
        Self {
            pattern_id: candidate.pattern_id,
            captured: candidate.captured.clone(),
            span: candidate.span,
            reason,
        }
    }
}

/// Result of resolving one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExtractionResult {
    pub category: FieldCategory,
    pub status: FieldStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,

    /// Winning pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<u64>,

    /// Raw text of the winning capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_capture: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    /// Whether the winner passed an explicit validation expression.
    pub validated: bool,

    pub field_confidence: f32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedCandidate>,
}

impl FieldExtractionResult {
    /// A category that no pattern matched.
    pub fn unresolved(category: FieldCategory) -> Self {
        Self {
            category,
            status: FieldStatus::Unresolved,
            value: None,
            pattern_id: None,
            raw_capture: None,
            span: None,
            validated: false,
            field_confidence: 0.0,
            rejected: Vec::new(),
        }
    }

    /// A category won by `candidate`, which carries its scored contribution.
    pub fn resolved(
        category: FieldCategory,
        value: FieldValue,
        candidate: MatchCandidate,
        validated: bool,
        rejected: Vec<RejectedCandidate>,
    ) -> Self {
        Self {
            category,
            status: FieldStatus::Resolved,
            value: Some(value),
            pattern_id: Some(candidate.pattern_id),
            raw_capture: Some(candidate.captured),
            span: Some(candidate.span),
            validated,
            field_confidence: candidate.contribution.unwrap_or(0.0),
            rejected,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == FieldStatus::Resolved
    }
}

/// Terminal status of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionStatus {
    /// Every required category resolved.
    Complete,
    /// Some, not all, required categories resolved.
    Partial,
    /// No required category resolved.
    Failed,
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractionStatus::Complete => "COMPLETE",
            ExtractionStatus::Partial => "PARTIAL",
            ExtractionStatus::Failed => "FAILED",
        })
    }
}

/// Per-field line of the confidence breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfidence {
    pub category: FieldCategory,
    pub confidence: f32,
    pub required: bool,
    /// Whether this field counted toward the overall mean.
    pub counted: bool,
}

/// A pattern skipped because it could not be compiled or evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidPattern {
    pub pattern_id: u64,
    pub pattern_name: String,
    pub category: FieldCategory,
    pub reason: String,
}

/// Structured outcome of one extraction run.
///
/// Built fresh per run and never mutated afterwards. Contains no timestamps or
/// timings, so a fixed text and library snapshot serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceExtractionResult {
    pub status: ExtractionStatus,

    /// Overall extraction confidence (0.0 - 1.0).
    pub overall_confidence: f32,

    /// One result per requested category, in processing order.
    pub fields: Vec<FieldExtractionResult>,

    /// Winning pattern ids in processing order.
    pub used_pattern_ids: Vec<u64>,

    /// One line per category naming the winner and its capture.
    pub pattern_match_summary: String,

    pub confidence_breakdown: Vec<FieldConfidence>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_patterns: Vec<InvalidPattern>,

    pub source: SourceMetadata,
}

impl InvoiceExtractionResult {
    pub fn field(&self, category: FieldCategory) -> Option<&FieldExtractionResult> {
        self.fields.iter().find(|f| f.category == category)
    }

    pub fn value(&self, category: FieldCategory) -> Option<&FieldValue> {
        self.field(category).and_then(|f| f.value.as_ref())
    }

    pub fn amount(&self, category: FieldCategory) -> Option<Decimal> {
        self.value(category).and_then(FieldValue::as_amount)
    }

    pub fn date(&self, category: FieldCategory) -> Option<NaiveDate> {
        self.value(category).and_then(FieldValue::as_date)
    }

    pub fn text(&self, category: FieldCategory) -> Option<&str> {
        self.value(category).and_then(FieldValue::as_text)
    }

    /// Comma-delimited winning pattern ids, e.g. `12,4,31`.
    pub fn used_pattern_ids_text(&self) -> String {
        self.used_pattern_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Semicolon-delimited confidences, e.g. `AMOUNT=0.700;DATE=0.950;OVERALL=0.825`.
    pub fn confidence_detail(&self) -> String {
        let mut parts: Vec<String> = self
            .confidence_breakdown
            .iter()
            .map(|c| format!("{}={:.3}", c.category, c.confidence))
            .collect();
        parts.push(format!("OVERALL={:.3}", self.overall_confidence));
        parts.join(";")
    }
}
