//! Component metadata used to walk dependency graphs
//!
//! A component is a named, optionally versioned unit with runtime and
//! development requirements. Components come from upstream registry metadata
//! or from a parsed spec document.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::parser::types::{PackageFiles, SpecMetadata};
use crate::version::ordering::VersionString;
use crate::version::requirement::Requirement;

/// Files commonly shipped in gems that packages leave out
static IGNORABLE_FILES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\.gemtest$",
        r"^\.gitignore$",
        r"^\.travis\.yml$",
        r".*\.gemspec$",
        r"^Gemfile.*",
        r"^Rakefile$",
        r"^rspec.*",
        r"^\.yardopts$",
        r"^\.rvmrc$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Files commonly shipped in gems that packages mark as documentation
static DOC_FILES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(^|/)CHANGELOG.*",
        r"(^|/)CONTRIBUTING.*",
        r"(^|/)README.*",
        r"(^|/).*LICENSE",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Component {
    pub name: String,
    pub version: Option<VersionString>,
    /// Runtime requirements, in declaration order
    pub deps: Vec<Requirement>,
    /// Development-only requirements, in declaration order
    pub dev_deps: Vec<Requirement>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<VersionString>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_deps(mut self, deps: Vec<Requirement>) -> Self {
        self.deps = deps;
        self
    }

    pub fn with_dev_deps(mut self, dev_deps: Vec<Requirement>) -> Self {
        self.dev_deps = dev_deps;
        self
    }

    /// Build a component from a parsed spec
    ///
    /// Only requirements in `capability(...)` form count as component
    /// dependencies; `Requires` become runtime and `BuildRequires` development
    /// dependencies. The name is the short name when one is known.
    pub fn from_spec(meta: &SpecMetadata, capability: &str) -> Self {
        let name = meta
            .short_name
            .clone()
            .or_else(|| meta.full_name.clone())
            .unwrap_or_default();

        let unwrap = |req: &Requirement| {
            Requirement::new(req.component_name(), req.operator, req.version.clone())
        };

        Self {
            name,
            version: meta.full_version.clone().map(VersionString::from),
            deps: meta.requires_capability(capability).map(unwrap).collect(),
            dev_deps: meta.build_requires_capability(capability).map(unwrap).collect(),
        }
    }

    /// Artifact file name, e.g. `rails-4.1.0.gem`
    pub fn file_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}.gem", self.name, version),
            None => format!("{}.gem", self.name),
        }
    }
}

/// Whether `path` is a file packages usually drop
pub fn is_ignorable_file(path: &str) -> bool {
    IGNORABLE_FILES.iter().any(|re| re.is_match(path))
}

/// Whether `path` is a file packages usually ship as documentation
pub fn is_doc_file(path: &str) -> bool {
    DOC_FILES.iter().any(|re| re.is_match(path))
}

/// `%files` entries of one package that look misplaced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReview {
    /// Ignorable files the package still ships
    pub ignorable: Vec<String>,
    /// Documentation files listed without `%doc` or `%license`
    pub unmarked_docs: Vec<String>,
}

impl FileReview {
    pub fn of(files: &PackageFiles) -> Self {
        let mut review = Self::default();

        for entry in &files.files {
            let mut words: Vec<&str> = entry.split_whitespace().collect();
            let Some(path) = words.pop() else {
                continue;
            };
            let base = path.rsplit('/').next().unwrap_or(path);

            if is_ignorable_file(base) {
                review.ignorable.push(entry.clone());
            } else if is_doc_file(base) && !words.iter().any(|w| *w == "%doc" || *w == "%license") {
                review.unmarked_docs.push(entry.clone());
            }
        }

        review
    }

    pub fn is_empty(&self) -> bool {
        self.ignorable.is_empty() && self.unmarked_docs.is_empty()
    }
}

/// Review every `%files` section, keeping only packages with findings
pub fn review_files(meta: &SpecMetadata) -> IndexMap<String, FileReview> {
    meta.files
        .iter()
        .map(|(target, files)| (target.clone(), FileReview::of(files)))
        .filter(|(_, review)| !review.is_empty())
        .collect()
}
