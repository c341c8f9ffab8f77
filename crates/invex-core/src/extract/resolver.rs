//! Winner-takes-priority resolution of one field category.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::matcher::{match_pattern, CompiledPattern};
use super::rules::normalize;
use super::scoring::ConfidenceScorer;
use crate::library::UsageLedger;
use crate::models::extraction::{
    FieldExtractionResult, FieldStatus, RejectedCandidate, RejectionReason, Span,
};
use crate::models::pattern::FieldCategory;

/// Picks the winning candidate for one category.
///
/// Patterns are tried in the order given (ascending priority, then id). Every
/// candidate of a pattern is considered in text order before the next pattern
/// is tried, and the first candidate that survives normalization, validation
/// and span exclusion wins outright.
pub struct CategoryResolver<'a> {
    scorer: &'a ConfidenceScorer,
    ledger: &'a UsageLedger,
    now: DateTime<Utc>,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(scorer: &'a ConfidenceScorer, ledger: &'a UsageLedger, now: DateTime<Utc>) -> Self {
        Self { scorer, ledger, now }
    }

    /// Resolve `category` in `text`.
    ///
    /// Candidates overlapping any of `occupied` are rejected. On a win the
    /// pattern's usage counter is incremented.
    pub fn resolve(
        &self,
        category: FieldCategory,
        text: &str,
        patterns: &[CompiledPattern],
        occupied: &[Span],
    ) -> FieldExtractionResult {
        let mut rejected = Vec::new();
        let mut evaluated = false;

        for pattern in patterns {
            let definition = pattern.definition();

            for candidate in match_pattern(pattern, text) {
                if occupied.iter().any(|span| span.overlaps(&candidate.span)) {
                    trace!("{}: pattern {} candidate overlaps a claimed span", category, pattern.id());
                    rejected.push(RejectedCandidate::new(&candidate, RejectionReason::ClaimedSpan));
                    continue;
                }
                evaluated = true;

                let value = match normalize(category, &candidate.captured, definition.date_format.as_deref()) {
                    Ok(value) => value,
                    Err(e) => {
                        trace!("{}: pattern {} candidate rejected: {}", category, pattern.id(), e);
                        rejected.push(RejectedCandidate::new(
                            &candidate,
                            RejectionReason::Normalization { detail: e.to_string() },
                        ));
                        continue;
                    }
                };

                let validated = match pattern.validation() {
                    Some(validation) if validation.is_match(&value.to_string()) => true,
                    Some(_) => {
                        trace!("{}: pattern {} value '{}' failed validation", category, pattern.id(), value);
                        rejected.push(RejectedCandidate::new(&candidate, RejectionReason::Validation));
                        continue;
                    }
                    None => false,
                };

                let field_confidence = self.scorer.field_confidence(definition.confidence_weight, validated);
                self.ledger.record(pattern.slot, self.now);

                debug!(
                    "{}: pattern {} ({}) won with '{}' (confidence {:.3})",
                    category, pattern.id(), definition.name, value, field_confidence
                );

                let candidate = candidate.with_contribution(field_confidence);
                return FieldExtractionResult::resolved(category, value, candidate, validated, rejected);
            }
        }

        debug!("{}: no validated match ({} rejected candidates)", category, rejected.len());

        FieldExtractionResult {
            status: if evaluated {
                FieldStatus::RejectedByValidation
            } else {
                FieldStatus::Unresolved
            },
            rejected,
            ..FieldExtractionResult::unresolved(category)
        }
    }
}
