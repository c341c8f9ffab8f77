//! Core library for rule-based invoice field extraction.
//!
//! This crate provides:
//! - An immutable pattern library snapshot with lock-free usage counters
//! - Per-pattern matching and per-category winner-takes-priority resolution
//! - Normalization of amounts, dates, names, invoice numbers and currencies
//! - Field and overall confidence scoring with an audit trail

pub mod error;
pub mod extract;
pub mod library;
pub mod models;

pub use error::{InvexError, LibraryError, NormalizeError, PatternError, Result};
pub use extract::{ExtractionOrchestrator, InvoiceExtractor};
pub use library::{default_patterns, PatternLibrary, UsageDelta};
pub use models::config::{ExtractionConfig, InvexConfig};
pub use models::extraction::{
    ExtractionStatus, FieldExtractionResult, FieldStatus, FieldValue, InvoiceExtractionResult,
    SourceText, TextStatus,
};
pub use models::pattern::{FieldCategory, PatternDefinition};
pub use models::record::InvoiceRecord;
