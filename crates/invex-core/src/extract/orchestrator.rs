//! Drives every requested category over one text body and assembles the result.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, trace};

use super::resolver::CategoryResolver;
use super::scoring::ConfidenceScorer;
use super::InvoiceExtractor;
use crate::library::PatternLibrary;
use crate::models::config::ExtractionConfig;
use crate::models::extraction::{
    ExtractionStatus, FieldExtractionResult, FieldStatus, InvoiceExtractionResult, SourceText, Span,
};
use crate::models::pattern::FieldCategory;

/// Lifecycle of a single extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Matching,
    Complete,
    Partial,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Complete | RunState::Partial | RunState::Failed)
    }

    /// Allowed moves: PENDING → MATCHING, PENDING → FAILED, MATCHING → terminal.
    pub fn can_transition_to(self, next: RunState) -> bool {
        match self {
            RunState::Pending => matches!(next, RunState::Matching | RunState::Failed),
            RunState::Matching => next.is_terminal(),
            _ => false,
        }
    }
}

impl From<ExtractionStatus> for RunState {
    fn from(status: ExtractionStatus) -> Self {
        match status {
            ExtractionStatus::Complete => RunState::Complete,
            ExtractionStatus::Partial => RunState::Partial,
            ExtractionStatus::Failed => RunState::Failed,
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(state.can_transition_to(next), "illegal transition {:?} -> {:?}", state, next);
    trace!("Extraction run {:?} -> {:?}", state, next);
    *state = next;
}

/// Single-pass extraction over a shared pattern library snapshot.
///
/// Cheap to clone; clones share the snapshot and its usage ledger.
#[derive(Debug, Clone)]
pub struct ExtractionOrchestrator {
    library: Arc<PatternLibrary>,
    config: ExtractionConfig,
    scorer: ConfidenceScorer,
}

impl ExtractionOrchestrator {
    pub fn new(library: Arc<PatternLibrary>, config: ExtractionConfig) -> Self {
        let scorer = ConfidenceScorer::new(config.required_categories.clone())
            .with_unvalidated_penalty(config.unvalidated_penalty);
        Self { library, config, scorer }
    }

    pub fn library(&self) -> &Arc<PatternLibrary> {
        &self.library
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run one extraction. Never fails; check the result's status.
    pub fn run(&self, source: &SourceText) -> InvoiceExtractionResult {
        let start = Instant::now();
        let order = self.config.processing_order();
        let mut state = RunState::Pending;

        info!("Extracting {} categories from {} characters of text", order.len(), source.text.len());

        if source.text.trim().is_empty() {
            advance(&mut state, RunState::Failed);
            debug!("Empty text, extraction failed without matching");
            let fields: Vec<_> = order.iter().map(|c| FieldExtractionResult::unresolved(*c)).collect();
            return self.assemble(source, &order, fields, ExtractionStatus::Failed);
        }

        advance(&mut state, RunState::Matching);

        let resolver = CategoryResolver::new(&self.scorer, self.library.ledger(), Utc::now());
        let mut claimed: Vec<Span> = Vec::new();
        let mut fields = Vec::with_capacity(order.len());

        for category in &order {
            let occupied: &[Span] = if self.config.is_exclusive(*category) { &claimed } else { &[] };
            let field = resolver.resolve(
                *category,
                &source.text,
                self.library.patterns_for(*category),
                occupied,
            );

            if let Some(span) = field.span {
                claimed.push(span);
            }
            fields.push(field);
        }

        let status = self.scorer.status(&fields);
        advance(&mut state, status.into());

        let result = self.assemble(source, &order, fields, status);
        debug!(
            "Extraction {} with confidence {:.3} in {:?}",
            result.status,
            result.overall_confidence,
            start.elapsed()
        );
        result
    }

    fn assemble(
        &self,
        source: &SourceText,
        order: &[FieldCategory],
        fields: Vec<FieldExtractionResult>,
        status: ExtractionStatus,
    ) -> InvoiceExtractionResult {
        let confidence_breakdown = self.scorer.breakdown(&fields);
        let overall_confidence = self.scorer.overall_confidence(&confidence_breakdown);
        let used_pattern_ids = fields.iter().filter_map(|f| f.pattern_id).collect();
        let pattern_match_summary = self.summarize(&fields);
        let invalid_patterns = self
            .library
            .invalid_patterns()
            .iter()
            .filter(|p| order.contains(&p.category))
            .cloned()
            .collect();

        InvoiceExtractionResult {
            status,
            overall_confidence,
            fields,
            used_pattern_ids,
            pattern_match_summary,
            confidence_breakdown,
            invalid_patterns,
            source: source.metadata.clone(),
        }
    }

    /// One line per category: the winning pattern and its raw capture, or "no match".
    fn summarize(&self, fields: &[FieldExtractionResult]) -> String {
        fields
            .iter()
            .map(|field| match (field.status, field.pattern_id) {
                (FieldStatus::Resolved, Some(id)) => {
                    let name = self
                        .library
                        .get(id)
                        .map(|p| p.definition().name.as_str())
                        .unwrap_or("?");
                    format!(
                        "{}: pattern {} ({}) matched \"{}\"",
                        field.category,
                        id,
                        name,
                        field.raw_capture.as_deref().unwrap_or("")
                    )
                }
                (FieldStatus::RejectedByValidation, _) => format!(
                    "{}: no match ({} candidates rejected)",
                    field.category,
                    field.rejected.len()
                ),
                _ => format!("{}: no match", field.category),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl InvoiceExtractor for ExtractionOrchestrator {
    fn extract(&self, source: &SourceText) -> InvoiceExtractionResult {
        self.run(source)
    }
}
