//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// The pattern library snapshot is malformed.
    #[error("pattern library error: {0}")]
    Library(#[from] LibraryError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Contract violations in a pattern library snapshot.
///
/// These abort loading: a snapshot that carries them was produced by a broken
/// administration store, not by a bad invoice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LibraryError {
    /// Two definitions share one id.
    #[error("duplicate pattern id {0}")]
    DuplicatePatternId(u64),

    /// Weight outside (0.0, 1.0].
    #[error("pattern {id} has confidence weight {weight} outside (0, 1]")]
    InvalidWeight { id: u64, weight: f32 },

    /// Required field left empty.
    #[error("pattern {id} is missing required field '{field}'")]
    MissingField { id: u64, field: &'static str },
}

/// Problems local to a single pattern.
///
/// A pattern carrying one of these is skipped; every other pattern keeps
/// being evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// The main expression does not compile.
    #[error("expression does not compile: {0}")]
    Compile(String),

    /// The validation expression does not compile.
    #[error("validation expression does not compile: {0}")]
    ValidationCompile(String),

    /// The configured capture group does not exist in the expression.
    #[error("capture group {group} not present (expression has {available} groups)")]
    MissingCaptureGroup { group: usize, available: usize },

    /// Date patterns need a format to parse their capture.
    #[error("date pattern has no date format")]
    MissingDateFormat,
}

/// Reasons a captured value fails its category's normalization.
///
/// A rejected value makes the resolver fall through to the next candidate or
/// pattern; it never reaches the caller as an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// Nothing left after trimming.
    #[error("empty value")]
    Empty,

    /// Not a parseable amount.
    #[error("not an amount: {0}")]
    InvalidAmount(String),

    /// Amounts must be non-negative.
    #[error("negative amount: {0}")]
    NegativeAmount(String),

    /// Amounts carry at most two fractional digits.
    #[error("amount {0} has more than 2 fractional digits")]
    TooManyFractionDigits(String),

    /// The capture does not parse with the pattern's date format.
    #[error("'{value}' does not match date format '{format}'")]
    InvalidDate { value: String, format: String },

    /// Value shorter than the category allows.
    #[error("'{value}' is shorter than {min} characters")]
    TooShort { value: String, min: usize },

    /// Neither a known currency symbol nor a 3-letter code.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
