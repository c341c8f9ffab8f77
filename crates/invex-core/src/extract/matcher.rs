//! Applies one pattern's expression to a text body.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;
use crate::models::extraction::{MatchCandidate, Span};
use crate::models::pattern::PatternDefinition;

/// A pattern definition with its expressions compiled under the pattern's flags.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    definition: PatternDefinition,
    regex: Regex,
    validation: Option<Regex>,
    /// Index into the library's usage ledger.
    pub(crate) slot: usize,
}

impl CompiledPattern {
    /// Compile a definition. Case-insensitive unless the pattern says otherwise.
    pub fn compile(definition: PatternDefinition) -> Result<Self, PatternError> {
        let regex = build_regex(&definition.expression, &definition)
            .map_err(|e| PatternError::Compile(e.to_string()))?;

        // captures_len counts the implicit whole-match group 0
        let available = regex.captures_len() - 1;
        if definition.capture_group > available {
            return Err(PatternError::MissingCaptureGroup {
                group: definition.capture_group,
                available,
            });
        }

        let validation = match definition.validation_expression.as_deref() {
            Some(expr) => Some(
                build_regex(expr, &definition)
                    .map_err(|e| PatternError::ValidationCompile(e.to_string()))?,
            ),
            None => None,
        };

        if definition.category.is_date() && definition.date_format.is_none() {
            return Err(PatternError::MissingDateFormat);
        }

        Ok(Self {
            definition,
            regex,
            validation,
            slot: 0,
        })
    }

    pub fn definition(&self) -> &PatternDefinition {
        &self.definition
    }

    pub fn id(&self) -> u64 {
        self.definition.id
    }

    /// Validation expression, if the pattern has one.
    pub fn validation(&self) -> Option<&Regex> {
        self.validation.as_ref()
    }

    /// All non-overlapping matches, left to right.
    ///
    /// Matches in which the configured capture group did not participate are
    /// dropped.
    pub fn find_candidates(&self, text: &str) -> Vec<MatchCandidate> {
        let group = self.definition.capture_group;

        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let captured = caps.get(group)?;
                Some(MatchCandidate {
                    pattern_id: self.definition.id,
                    matched: whole.as_str().to_string(),
                    captured: captured.as_str().to_string(),
                    span: Span::new(captured.start(), captured.end()),
                    contribution: None,
                })
            })
            .collect()
    }
}

fn build_regex(expression: &str, definition: &PatternDefinition) -> Result<Regex, regex::Error> {
    RegexBuilder::new(expression)
        .case_insensitive(!definition.case_sensitive)
        .multi_line(definition.multiline)
        .build()
}

/// Match one pattern against `text`.
pub fn match_pattern(pattern: &CompiledPattern, text: &str) -> Vec<MatchCandidate> {
    pattern.find_candidates(text)
}
