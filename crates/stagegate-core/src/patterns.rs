use crate::error::{Result, StagegateError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pattern table
// ---------------------------------------------------------------------------

/// One row of the failure-marker table: a case-insensitive regex and what a
/// match means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDef {
    pub id: String,
    pub pattern: String,
    pub meaning: String,
}

/// Version of the built-in table. Bump when a row changes.
pub const TABLE_VERSION: u32 = 1;

/// Built-in markers that make command output "not clean" regardless of the
/// exit status: (id, pattern, meaning).
pub const DEFAULT_FAILURE_PATTERNS: &[(&str, &str, &str)] = &[
    ("error_count", r"\d+\s+error(s)?", "numeric error count in a tool summary"),
    ("error_marker", r"ERROR:", "literal ERROR: prefix"),
    ("failed_marker", r"FAILED", "literal FAILED marker"),
    ("failure_glyph", "\u{2716}", "heavy multiplication x glyph used by linters"),
    ("found_errors", r"found .* error", "\"found N errors\" summary line"),
    ("compilation_failed", r"compilation failed", "compiler aborted"),
    ("type_error", r"type error", "type checker finding"),
    ("mypy_error", r"mypy:.*error", "mypy error line"),
];

pub fn default_pattern_defs() -> Vec<PatternDef> {
    DEFAULT_FAILURE_PATTERNS
        .iter()
        .map(|(id, pattern, meaning)| PatternDef {
            id: (*id).to_string(),
            pattern: (*pattern).to_string(),
            meaning: (*meaning).to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PatternSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub def: PatternDef,
    regex: Regex,
}

impl CompiledPattern {
    pub fn compile(def: PatternDef) -> Result<Self> {
        let regex = RegexBuilder::new(&def.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| StagegateError::InvalidPattern {
                id: def.id.clone(),
                source,
            })?;
        Ok(Self { def, regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The effective failure-marker table, in evaluation order.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn compile(defs: impl IntoIterator<Item = PatternDef>) -> Result<Self> {
        let patterns = defs
            .into_iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Built-in table only.
    pub fn builtin() -> Self {
        Self::compile(default_pattern_defs())
            .expect("built-in failure patterns are valid regexes")
    }

    /// Built-in table followed by `extra`.
    pub fn with_extra(extra: &[PatternDef]) -> Result<Self> {
        Self::compile(default_pattern_defs().into_iter().chain(extra.iter().cloned()))
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// First pattern matching `text`, if any.
    pub fn first_match(&self, text: &str) -> Option<&PatternDef> {
        self.patterns
            .iter()
            .find(|p| p.is_match(text))
            .map(|p| &p.def)
    }

    /// Every pattern matching `text`.
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a PatternDef> + 'a {
        self.patterns
            .iter()
            .filter(move |p| p.is_match(text))
            .map(|p| &p.def)
    }
}
