//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::InvexError;
use crate::models::pattern::FieldCategory;

/// Main configuration for invex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Pattern library configuration.
    pub library: LibraryConfig,
}

/// Extraction engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Categories to extract, in processing order.
    pub categories: Vec<FieldCategory>,

    /// Categories whose absence lowers the overall confidence and status.
    pub required_categories: Vec<FieldCategory>,

    /// Quality factor for matches accepted without a validation expression.
    pub unvalidated_penalty: f32,

    /// Categories that may not reuse text claimed by earlier categories.
    pub exclusive_categories: Vec<FieldCategory>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            categories: FieldCategory::ALL.to_vec(),
            required_categories: vec![
                FieldCategory::InvoiceNumber,
                FieldCategory::Amount,
                FieldCategory::Date,
                FieldCategory::Vendor,
            ],
            unvalidated_penalty: 0.7,
            exclusive_categories: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    /// Requested categories followed by any required ones not listed, without duplicates.
    pub fn processing_order(&self) -> Vec<FieldCategory> {
        let mut order: Vec<FieldCategory> = Vec::new();
        for category in self.categories.iter().chain(&self.required_categories) {
            if !order.contains(category) {
                order.push(*category);
            }
        }
        order
    }

    pub fn is_exclusive(&self, category: FieldCategory) -> bool {
        self.exclusive_categories.contains(&category)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), InvexError> {
        if !(0.0..=1.0).contains(&self.unvalidated_penalty) {
            return Err(InvexError::Config(format!(
                "unvalidated_penalty must be within [0, 1], got {}",
                self.unvalidated_penalty
            )));
        }
        Ok(())
    }
}

/// Pattern library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// JSON file with pattern definitions (built-in library when unset).
    pub patterns_file: Option<PathBuf>,
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, InvexError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), InvexError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
