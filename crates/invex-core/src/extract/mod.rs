//! Invoice field extraction: matching, resolution, scoring and orchestration.

pub mod matcher;
mod orchestrator;
pub mod patterns;
pub mod resolver;
pub mod rules;
pub mod scoring;

pub use matcher::{match_pattern, CompiledPattern};
pub use orchestrator::{ExtractionOrchestrator, RunState};
pub use resolver::CategoryResolver;
pub use scoring::{ConfidenceScorer, DEFAULT_UNVALIDATED_PENALTY};

use crate::models::extraction::{InvoiceExtractionResult, SourceText};

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract invoice fields from extracted text and its metadata.
    fn extract(&self, source: &SourceText) -> InvoiceExtractionResult;

    /// Extract invoice fields from plain text.
    fn extract_from_text(&self, text: &str) -> InvoiceExtractionResult {
        self.extract(&SourceText::new(text))
    }
}
