//! Field and overall confidence scoring.

use crate::models::extraction::{ExtractionStatus, FieldConfidence, FieldExtractionResult};
use crate::models::pattern::FieldCategory;

/// Default quality factor for matches accepted without a validation expression.
pub const DEFAULT_UNVALIDATED_PENALTY: f32 = 0.7;

/// Turns pattern weights into field confidences and aggregates them.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    unvalidated_penalty: f32,
    required: Vec<FieldCategory>,
}

impl ConfidenceScorer {
    pub fn new(required: Vec<FieldCategory>) -> Self {
        Self {
            unvalidated_penalty: DEFAULT_UNVALIDATED_PENALTY,
            required,
        }
    }

    /// Set the quality factor for unvalidated matches (clamped to [0, 1]).
    pub fn with_unvalidated_penalty(mut self, penalty: f32) -> Self {
        self.unvalidated_penalty = clamp_unit(penalty);
        self
    }

    pub fn is_required(&self, category: FieldCategory) -> bool {
        self.required.contains(&category)
    }

    /// `weight × quality`, where quality is 1.0 for a validated match and the
    /// unvalidated penalty otherwise.
    pub fn field_confidence(&self, weight: f32, validated: bool) -> f32 {
        let quality = if validated { 1.0 } else { self.unvalidated_penalty };
        clamp_unit(weight * quality)
    }

    /// Per-field confidences and whether each counts toward the mean.
    ///
    /// Required fields always count (unresolved ones as 0). Optional fields
    /// count only when resolved.
    pub fn breakdown(&self, fields: &[FieldExtractionResult]) -> Vec<FieldConfidence> {
        fields
            .iter()
            .map(|field| {
                let required = self.is_required(field.category);
                FieldConfidence {
                    category: field.category,
                    confidence: if field.is_resolved() { field.field_confidence } else { 0.0 },
                    required,
                    counted: required || field.is_resolved(),
                }
            })
            .collect()
    }

    /// Arithmetic mean over the counted fields; 0.0 when nothing counts.
    pub fn overall_confidence(&self, breakdown: &[FieldConfidence]) -> f32 {
        let counted: Vec<f32> = breakdown
            .iter()
            .filter(|c| c.counted)
            .map(|c| c.confidence)
            .collect();

        if counted.is_empty() {
            return 0.0;
        }
        clamp_unit(counted.iter().sum::<f32>() / counted.len() as f32)
    }

    /// COMPLETE when every required category resolved, PARTIAL when some did,
    /// FAILED when none did. Without required categories any resolved field
    /// makes the run COMPLETE.
    pub fn status(&self, fields: &[FieldExtractionResult]) -> ExtractionStatus {
        let required: Vec<&FieldExtractionResult> = fields
            .iter()
            .filter(|f| self.is_required(f.category))
            .collect();

        if required.is_empty() {
            return if fields.iter().any(FieldExtractionResult::is_resolved) {
                ExtractionStatus::Complete
            } else {
                ExtractionStatus::Failed
            };
        }

        let resolved = required.iter().filter(|f| f.is_resolved()).count();
        if resolved == required.len() {
            ExtractionStatus::Complete
        } else if resolved > 0 {
            ExtractionStatus::Partial
        } else {
            ExtractionStatus::Failed
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
