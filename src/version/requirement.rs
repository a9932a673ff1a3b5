//! Version requirements declared by specs and gem metadata
//!
//! Supported forms:
//! - `rake` - any version (same as `rake >= 0`)
//! - `rake >= 10.0` - comparison operators `=`, `!=`, `>`, `>=`, `<`, `<=`
//! - `rake ~> 10.1` - pessimistic: `>= 10.1` and `< 11`
//! - `rubygem(rake) >= 10.0` - RPM capability form, the inner name is the component

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::version::ordering::{VersionString, numeric_release};

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+?)\s*(?:(~>|!=|>=|<=|=|>|<)\s*(\S+))?\s*$").expect("valid regex")
});

static CAPABILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^()\s]+\(([^()\s]+)\)$").expect("valid regex"));

static CONSTRAINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(~>|!=|>=|<=|=|>|<)?\s*(\S+)\s*$").expect("valid regex"));

/// Comparison operator of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "~>")]
    Pessimistic,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Pessimistic => "~>",
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::NotEq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            "~>" => Ok(Operator::Pessimistic),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One version constraint against a named component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    /// Name as written, possibly in capability form (`rubygem(rake)`)
    pub name: String,
    pub operator: Operator,
    pub version: VersionString,
}

impl Requirement {
    pub fn new(name: impl Into<String>, operator: Operator, version: impl Into<VersionString>) -> Self {
        Self {
            name: name.into(),
            operator,
            version: version.into(),
        }
    }

    /// Requirement matching every version of `name`
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Operator::Gte, "0")
    }

    /// Parse a single requirement such as `rubygem(rake) >= 10.0`
    ///
    /// Returns `None` for empty input or an unrecognized operator.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = REQUIREMENT_RE.captures(text)?;
        let name = caps.get(1)?.as_str();

        match (caps.get(2), caps.get(3)) {
            (Some(op), Some(version)) => Some(Self::new(
                name,
                op.as_str().parse().ok()?,
                version.as_str(),
            )),
            _ => Some(Self::any(name)),
        }
    }

    /// Expand a rubygems requirement list (`">= 1.0, < 2.0"`) for `name`
    ///
    /// Unparseable clauses are dropped.
    pub fn parse_list(name: &str, constraints: &str) -> Vec<Self> {
        let parsed: Vec<Self> = constraints
            .split(',')
            .filter_map(|clause| {
                let caps = CONSTRAINT_RE.captures(clause)?;
                let operator = match caps.get(1) {
                    Some(op) => op.as_str().parse().ok()?,
                    None => Operator::Eq,
                };
                Some(Self::new(name, operator, caps.get(2)?.as_str()))
            })
            .collect();

        if parsed.is_empty() {
            vec![Self::any(name)]
        } else {
            parsed
        }
    }

    /// Component name with any capability wrapper removed
    pub fn component_name(&self) -> &str {
        CAPABILITY_RE
            .captures(&self.name)
            .and_then(|caps| caps.get(1))
            .map_or(self.name.as_str(), |m| m.as_str())
    }

    /// Capability prefix (`rubygem` for `rubygem(rake)`), if any
    pub fn capability(&self) -> Option<&str> {
        CAPABILITY_RE
            .is_match(&self.name)
            .then(|| self.name.split('(').next())
            .flatten()
    }

    /// Operator and version, e.g. `>= 1.0`
    pub fn constraint(&self) -> String {
        format!("{} {}", self.operator, self.version)
    }

    /// Whether `version` satisfies this requirement
    pub fn satisfied_by(&self, version: &VersionString) -> bool {
        let required = &self.version;
        match self.operator {
            Operator::Eq => version == required,
            Operator::NotEq => version != required,
            Operator::Gt => version > required,
            Operator::Gte => version >= required,
            Operator::Lt => version < required,
            Operator::Lte => version <= required,
            Operator::Pessimistic => {
                version >= required
                    && pessimistic_upper_bound(required.as_str())
                        .is_none_or(|upper| *version < upper)
            }
        }
    }

    /// Whether this requirement applies to `name` and is satisfied by `version`
    pub fn matches(&self, name: &str, version: &VersionString) -> bool {
        self.component_name() == name && self.satisfied_by(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.operator, self.version)
    }
}

/// Exclusive upper bound of `~> version`
///
/// `~> 1.2.3` is bounded by `1.3`, `~> 1.2` by `2`, `~> 1` has no upper bound.
fn pessimistic_upper_bound(version: &str) -> Option<VersionString> {
    let mut release = numeric_release(version);
    if release.len() < 2 {
        return None;
    }
    release.pop();
    if let Some(last) = release.last_mut() {
        *last += 1;
    }

    let bound = release
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".");
    Some(VersionString::new(bound))
}

/// Whether `version` satisfies every requirement in the set
pub fn satisfies_all(requirements: &[Requirement], version: &VersionString) -> bool {
    requirements.iter().all(|req| req.satisfied_by(version))
}
