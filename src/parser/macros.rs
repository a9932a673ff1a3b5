//! Spec macro definitions and `%{label}` substitution
//!
//! Only single-level substitution is supported: a reference is replaced by the
//! raw value of its definition and the result is not scanned again. References
//! to undefined labels stay in the output untouched.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::Serialize;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([^{}\s]+)\}").expect("valid regex"));

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*%(?:global|define)\s+([A-Za-z_][A-Za-z0-9_]*)\s+(.*?)\s*$")
        .expect("valid regex")
});

/// A single `%global label value` definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro {
    pub label: String,
    pub value: String,
}

impl Macro {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Whether the line is a `%global` / `%define` definition
    pub fn is_definition(line: &str) -> bool {
        DEFINITION_RE.is_match(line)
    }

    /// Parse a definition line into a macro
    pub fn parse_definition(line: &str) -> Option<Self> {
        let caps = DEFINITION_RE.captures(line)?;
        Some(Self::new(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }
}

/// Whether `text` contains at least one `%{label}` reference
pub fn included_in(text: &str) -> bool {
    REFERENCE_RE.is_match(text)
}

/// Macro definitions in the order they were seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MacroTable {
    macros: IndexMap<String, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) `label`; a redefinition keeps its original position
    pub fn define(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        self.macros
            .insert(label.clone(), Macro::new(label, value));
    }

    pub fn insert(&mut self, definition: Macro) {
        self.macros.insert(definition.label.clone(), definition);
    }

    pub fn get(&self, label: &str) -> Option<&Macro> {
        self.macros.get(label)
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.get(label).map(|m| m.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Replace every defined `%{label}` in `text`, left to right, in one pass
    pub fn resolve(&self, text: &str) -> String {
        REFERENCE_RE
            .replace_all(text, |caps: &Captures| match self.value_of(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
