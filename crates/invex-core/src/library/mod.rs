//! Immutable, shareable snapshot of the active pattern library.

mod defaults;
mod usage;

pub use defaults::default_patterns;
pub use usage::{UsageDelta, UsageLedger};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{LibraryError, Result};
use crate::extract::matcher::CompiledPattern;
use crate::models::extraction::InvalidPattern;
use crate::models::pattern::{FieldCategory, PatternDefinition};

/// Read view over the pattern definitions of one processing batch.
///
/// Patterns are compiled once when the snapshot is built and grouped by
/// category in ascending `(priority, id)` order. Concurrent runs share one
/// snapshot behind an `Arc` without locking; only the usage ledger mutates.
/// Inactive patterns are never handed to extraction.
#[derive(Debug)]
pub struct PatternLibrary {
    by_category: BTreeMap<FieldCategory, Vec<CompiledPattern>>,
    inactive: Vec<CompiledPattern>,
    invalid: Vec<InvalidPattern>,
    slots: HashMap<u64, usize>,
    ledger: UsageLedger,
}

impl PatternLibrary {
    /// Build a snapshot from the active definitions.
    ///
    /// Inactive definitions are dropped. Patterns that do not compile are kept
    /// aside as [`InvalidPattern`]s. Duplicate ids, weights outside (0, 1] and
    /// empty names or expressions are contract violations and fail the load.
    pub fn from_definitions(definitions: Vec<PatternDefinition>) -> std::result::Result<Self, LibraryError> {
        Self::build(definitions, false)
    }

    /// Like [`from_definitions`](Self::from_definitions), optionally compiling
    /// inactive patterns into a side list for inspection.
    pub fn build(
        definitions: Vec<PatternDefinition>,
        include_inactive: bool,
    ) -> std::result::Result<Self, LibraryError> {
        check_contract(&definitions)?;

        let mut by_category: BTreeMap<FieldCategory, Vec<CompiledPattern>> = BTreeMap::new();
        let mut inactive = Vec::new();
        let mut invalid = Vec::new();
        let mut slots = HashMap::new();
        let mut ledger = UsageLedger::default();

        for definition in definitions {
            if !definition.is_active && !include_inactive {
                continue;
            }

            let (id, name, category) = (definition.id, definition.name.clone(), definition.category);
            let (usage_count, last_used_at) = (definition.usage_count, definition.last_used_at);
            let is_active = definition.is_active;

            match CompiledPattern::compile(definition) {
                Ok(pattern) if !is_active => inactive.push(pattern),
                Ok(mut pattern) => {
                    pattern.slot = ledger.register(id, usage_count, last_used_at);
                    slots.insert(id, pattern.slot);
                    by_category.entry(category).or_default().push(pattern);
                }
                Err(e) => {
                    warn!("Pattern {} ({}) is invalid and will be skipped: {}", id, name, e);
                    invalid.push(InvalidPattern {
                        pattern_id: id,
                        pattern_name: name,
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for patterns in by_category.values_mut() {
            patterns.sort_by_key(|p| (p.definition().priority, p.id()));
        }
        inactive.sort_by_key(|p| (p.definition().category, p.definition().priority, p.id()));
        invalid.sort_by_key(|p| p.pattern_id);

        debug!(
            "Loaded pattern library: {} usable patterns in {} categories, {} invalid",
            slots.len(),
            by_category.len(),
            invalid.len()
        );

        Ok(Self {
            by_category,
            inactive,
            invalid,
            slots,
            ledger,
        })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<PatternDefinition> = serde_json::from_str(json)?;
        Ok(Self::from_definitions(definitions)?)
    }

    /// Load a JSON array of definitions from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let definitions: Vec<PatternDefinition> = serde_json::from_str(&content)?;
        Ok(Self::from_definitions(definitions)?)
    }

    /// The built-in English invoice library.
    pub fn builtin() -> Self {
        Self::from_definitions(default_patterns()).unwrap_or_else(|e| {
            warn!("Built-in pattern library rejected: {}", e);
            Self::empty()
        })
    }

    /// A library with no patterns.
    pub fn empty() -> Self {
        Self {
            by_category: BTreeMap::new(),
            inactive: Vec::new(),
            invalid: Vec::new(),
            slots: HashMap::new(),
            ledger: UsageLedger::default(),
        }
    }

    /// Usable patterns of `category`, highest priority first.
    pub fn patterns_for(&self, category: FieldCategory) -> &[CompiledPattern] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories that have at least one usable pattern.
    pub fn categories(&self) -> impl Iterator<Item = FieldCategory> + '_ {
        self.by_category.keys().copied()
    }

    /// Inactive patterns kept by [`build`](Self::build), by category, priority and id.
    pub fn inactive_patterns(&self) -> &[CompiledPattern] {
        &self.inactive
    }

    /// Patterns skipped because they could not be compiled, by ascending id.
    pub fn invalid_patterns(&self) -> &[InvalidPattern] {
        &self.invalid
    }

    /// Look up a usable pattern by id.
    pub fn get(&self, id: u64) -> Option<&CompiledPattern> {
        self.by_category
            .values()
            .flat_map(|patterns| patterns.iter())
            .find(|p| p.id() == id)
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Snapshot usage count plus wins recorded since.
    pub fn usage_count(&self, id: u64) -> Option<u64> {
        self.slots.get(&id).and_then(|&slot| self.ledger.usage_count(slot))
    }

    pub fn last_used_at(&self, id: u64) -> Option<DateTime<Utc>> {
        self.slots.get(&id).and_then(|&slot| self.ledger.last_used_at(slot))
    }

    /// Hand the accumulated usage increments to the pattern store.
    pub fn drain_usage(&self) -> Vec<UsageDelta> {
        self.ledger.drain()
    }
}

fn check_contract(definitions: &[PatternDefinition]) -> std::result::Result<(), LibraryError> {
    let mut seen = HashSet::new();

    for def in definitions {
        if !seen.insert(def.id) {
            return Err(LibraryError::DuplicatePatternId(def.id));
        }
        if def.name.trim().is_empty() {
            return Err(LibraryError::MissingField { id: def.id, field: "name" });
        }
        if def.expression.trim().is_empty() {
            return Err(LibraryError::MissingField { id: def.id, field: "expression" });
        }
        if !(def.confidence_weight > 0.0 && def.confidence_weight <= 1.0) {
            return Err(LibraryError::InvalidWeight {
                id: def.id,
                weight: def.confidence_weight,
            });
        }
    }

    Ok(())
}
