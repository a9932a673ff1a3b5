//! RPM spec parser
//!
//! Scans a spec document line by line. Each line is offered to a fixed list of
//! classifiers in priority order and only the first match applies:
//!
//! ```text
//! comment > %global/%define > Name > Version > Release > %package
//!         > Requires > BuildRequires > %changelog > %files > %files <pkg>
//!         > %check > section body
//! ```
//!
//! `Requires` and `BuildRequires` are only collected before the first
//! `%package`. Malformed lines never fail the parse; they are skipped, or kept
//! verbatim inside `%changelog`.

use regex::Regex;

use crate::config::SpecConfig;
use crate::parser::macros::{Macro, included_in};
use crate::parser::types::SpecMetadata;
use crate::version::requirement::Requirement;

/// Which section body the scanner is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Header tags, scriptlets and anything before a body section
    Preamble,
    /// `%files` body; `None` targets the top-level package
    Files(Option<String>),
    /// `%changelog` body, never left once entered
    Changelog,
}

/// Structural markers that move the scanner between sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Changelog,
    Files,
    SubpackageFiles(String),
}

impl Section {
    /// Transition table for section markers
    pub fn on_marker(self, marker: Marker) -> Section {
        match (self, marker) {
            (Section::Changelog, _) => Section::Changelog,
            (_, Marker::Changelog) => Section::Changelog,
            (_, Marker::Files) => Section::Files(None),
            (_, Marker::SubpackageFiles(name)) => Section::Files(Some(name)),
        }
    }
}

/// Scanner state carried from line to line
#[derive(Debug, Clone)]
struct ScanState {
    section: Section,
    /// Set by the first `%package` and kept for the rest of the document
    in_subpackage: bool,
    changelog: Vec<String>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            section: Section::Preamble,
            in_subpackage: false,
            changelog: Vec::new(),
        }
    }

    fn enter(&mut self, marker: Marker) {
        let section = std::mem::replace(&mut self.section, Section::Preamble);
        self.section = section.on_marker(marker);
    }
}

/// Parser for RPM spec documents
pub struct SpecParser {
    comment_re: Regex,
    name_re: Regex,
    prefixed_name_re: Regex,
    version_re: Regex,
    release_re: Regex,
    subpackage_re: Regex,
    requires_re: Regex,
    build_requires_re: Regex,
    changelog_re: Regex,
    files_re: Regex,
    subpackage_files_re: Regex,
    check_re: Regex,
    excluded_file_re: Regex,
    short_name_macro: String,
}

impl SpecParser {
    pub fn new(config: &SpecConfig) -> Self {
        let prefix = regex::escape(&config.package_prefix);
        Self {
            comment_re: Regex::new(r"^\s*#").unwrap(),
            name_re: Regex::new(r"^Name:\s*(.*)$").unwrap(),
            prefixed_name_re: Regex::new(&format!(r"^Name:\s*{}(.*)$", prefix)).unwrap(),
            version_re: Regex::new(r"^Version:\s*(.*)$").unwrap(),
            release_re: Regex::new(r"^Release:\s*(.*)$").unwrap(),
            subpackage_re: Regex::new(r"^%package\s+(?:-n\s+)?(\S+)").unwrap(),
            requires_re: Regex::new(r"^Requires:\s*(.*)$").unwrap(),
            build_requires_re: Regex::new(r"^BuildRequires:\s*(.*)$").unwrap(),
            changelog_re: Regex::new(r"^%changelog\s*$").unwrap(),
            files_re: Regex::new(r"^%files\s*$").unwrap(),
            subpackage_files_re: Regex::new(r"^%files\s+(?:-n\s+)?(\S+)").unwrap(),
            check_re: Regex::new(r"^%check\s*$").unwrap(),
            excluded_file_re: Regex::new(r"^%exclude\s+(.*)$").unwrap(),
            short_name_macro: config.short_name_macro.clone(),
        }
    }

    /// Parse `content` into spec metadata
    pub fn parse(&self, content: &str) -> SpecMetadata {
        let mut meta = SpecMetadata::default();
        let mut state = ScanState::new();

        for line in content.lines() {
            self.scan_line(line, &mut meta, &mut state);
        }

        meta.changelog_entries = split_changelog(&state.changelog);
        meta
    }

    fn scan_line(&self, line: &str, meta: &mut SpecMetadata, state: &mut ScanState) {
        if self.comment_re.is_match(line) {
            return;
        }

        if let Some(definition) = Macro::parse_definition(line) {
            if definition.label == self.short_name_macro {
                meta.short_name = Some(definition.value.clone());
            }
            meta.macros.insert(definition);
        } else if let Some(name) = capture(&self.name_re, line) {
            if let Some(short) = capture(&self.prefixed_name_re, line) {
                if short != format!("%{{{}}}", self.short_name_macro) {
                    meta.short_name = Some(short);
                }
            }
            meta.full_name = Some(self.substitute(&name, meta));
            meta.name = Some(name);
        } else if let Some(version) = capture(&self.version_re, line) {
            meta.full_version = Some(self.substitute(&version, meta));
            meta.version = Some(version);
        } else if let Some(release) = capture(&self.release_re, line) {
            meta.release = Some(release);
        } else if let Some(subpackage) = capture(&self.subpackage_re, line) {
            meta.subpackages.push(subpackage);
            state.in_subpackage = true;
        } else if let Some(req) = self.top_level(&self.requires_re, line, state) {
            meta.requires.extend(Requirement::parse(&req));
        } else if let Some(req) = self.top_level(&self.build_requires_re, line, state) {
            meta.build_requires.extend(Requirement::parse(&req));
        } else if self.changelog_re.is_match(line) {
            state.enter(Marker::Changelog);
        } else if self.files_re.is_match(line) {
            state.enter(Marker::Files);
        } else if let Some(subpackage) = capture(&self.subpackage_files_re, line) {
            state.enter(Marker::SubpackageFiles(subpackage));
        } else if self.check_re.is_match(line) {
            meta.has_check = true;
        } else {
            self.scan_body(line, meta, state);
        }
    }

    fn scan_body(&self, line: &str, meta: &mut SpecMetadata, state: &mut ScanState) {
        match &state.section {
            Section::Preamble => {}
            Section::Changelog => state.changelog.push(line.to_string()),
            Section::Files(subpackage) => {
                let target = subpackage
                    .clone()
                    .unwrap_or_else(|| meta.top_level_target());
                let entry = meta.files.entry(target).or_default();

                if let Some(excluded) = capture(&self.excluded_file_re, line) {
                    if !excluded.is_empty() {
                        entry.excludes.push(excluded);
                    }
                } else {
                    let file = line.trim();
                    if !file.is_empty() {
                        entry.files.push(file.to_string());
                    }
                }
            }
        }
    }

    /// Match a requirement tag only outside subpackage scope
    fn top_level(&self, re: &Regex, line: &str, state: &ScanState) -> Option<String> {
        if state.in_subpackage {
            return None;
        }
        capture(re, line)
    }

    fn substitute(&self, raw: &str, meta: &SpecMetadata) -> String {
        if included_in(raw) {
            meta.macros.resolve(raw)
        } else {
            raw.to_string()
        }
    }
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Split accumulated changelog lines into entries at blank lines
fn split_changelog(lines: &[String]) -> Vec<String> {
    lines
        .split(|line| line.trim().is_empty())
        .map(|chunk| chunk.join("\n").trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::requirement::Operator;

    fn parser() -> SpecParser {
        SpecParser::new(&SpecConfig::default())
    }

    const RAILS_SPEC: &str = r#"# Generated from rails-4.1.0.gem by gem2rpm -*- rpm-spec -*-
%global gem_name rails

Summary: Full-stack web application framework
Name: rubygem-%{gem_name}
Version: 4.1.0
Release: 1%{?dist}
Requires: rubygem(activesupport) = 4.1.0
Requires: rubygem(bundler) >= 1.3.0
BuildRequires: rubygems-devel
BuildArch: noarch

%package doc
Summary: Documentation for %{name}
Requires: %{name} = %{version}-%{release}

%description
Ruby on Rails is a full-stack web framework.

%prep
%setup -q -c -T

%check
pushd .%{gem_instdir}
popd

%files
%dir %{gem_instdir}
%{gem_libdir}
%exclude %{gem_cache}
%{gem_spec}

%files doc
%doc %{gem_docdir}
%exclude %{gem_instdir}/.gitignore

%changelog
* Tue Apr 15 2014 Jane Packager <jane@example.com> - 4.1.0-1
- Update to Rails 4.1.0.

* Mon Dec 23 2013 Jane Packager <jane@example.com> - 4.0.2-1
- Update to Rails 4.0.2.
"#;

    #[test]
    fn parse_extracts_header_fields() {
        let meta = parser().parse(RAILS_SPEC);

        assert_eq!(meta.name.as_deref(), Some("rubygem-%{gem_name}"));
        assert_eq!(meta.full_name.as_deref(), Some("rubygem-rails"));
        assert_eq!(meta.short_name.as_deref(), Some("rails"));
        assert_eq!(meta.version.as_deref(), Some("4.1.0"));
        assert_eq!(meta.full_version.as_deref(), Some("4.1.0"));
        assert_eq!(meta.release.as_deref(), Some("1%{?dist}"));
        assert!(meta.has_check);
        assert_eq!(meta.subpackages, vec!["doc".to_string()]);
    }

    #[test]
    fn parse_collects_only_top_level_requirements() {
        let meta = parser().parse(RAILS_SPEC);

        assert_eq!(
            meta.requires,
            vec![
                Requirement::new("rubygem(activesupport)", Operator::Eq, "4.1.0"),
                Requirement::new("rubygem(bundler)", Operator::Gte, "1.3.0"),
            ]
        );
        assert_eq!(meta.build_requires, vec![Requirement::any("rubygems-devel")]);
    }

    #[test]
    fn parse_ignores_requires_declared_in_subpackage() {
        let spec = "Name: foo\nRequires: foo >= 1.0\n%package doc\nRequires: foo >= 2.0\n";
        let meta = parser().parse(spec);

        assert_eq!(meta.requires, vec![Requirement::new("foo", Operator::Gte, "1.0")]);
    }

    #[test]
    fn parse_assigns_files_and_excludes_per_target() {
        let meta = parser().parse(RAILS_SPEC);

        let top = meta.files_for("rubygem-rails").unwrap();
        assert_eq!(
            top.files,
            vec!["%dir %{gem_instdir}", "%{gem_libdir}", "%{gem_spec}"]
        );
        assert_eq!(top.excludes, vec!["%{gem_cache}"]);

        let doc = meta.files_for("doc").unwrap();
        assert_eq!(doc.files, vec!["%doc %{gem_docdir}"]);
        assert_eq!(doc.excludes, vec!["%{gem_instdir}/.gitignore"]);
    }

    #[test]
    fn parse_files_section_for_named_subpackage() {
        let meta = parser().parse("%files doc\nREADME\n%exclude CHANGELOG\n\n");

        let doc = meta.files_for("doc").unwrap();
        assert_eq!(doc.files, vec!["README"]);
        assert_eq!(doc.excludes, vec!["CHANGELOG"]);
    }

    #[test]
    fn parse_splits_changelog_into_entries() {
        let meta = parser().parse(RAILS_SPEC);

        assert_eq!(
            meta.changelog_entries,
            vec![
                "* Tue Apr 15 2014 Jane Packager <jane@example.com> - 4.1.0-1\n- Update to Rails 4.1.0.",
                "* Mon Dec 23 2013 Jane Packager <jane@example.com> - 4.0.2-1\n- Update to Rails 4.0.2.",
            ]
        );
    }

    #[test]
    fn changelog_is_terminal() {
        let meta = parser().parse("Name: foo\n%changelog\n- entry\n%files\nnot-a-file\n");

        assert!(meta.files.is_empty());
        assert_eq!(meta.changelog_entries, vec!["- entry\nnot-a-file"]);
    }

    #[test]
    fn macros_are_not_hoisted() {
        let spec = "Name: rubygem-%{gem_name}\n%global gem_name rails\nVersion: %{ver}\n";
        let meta = parser().parse(spec);

        assert_eq!(meta.full_name.as_deref(), Some("rubygem-%{gem_name}"));
        assert_eq!(meta.full_version.as_deref(), Some("%{ver}"));
        assert_eq!(meta.macros.value_of("gem_name"), Some("rails"));
    }

    #[test]
    fn rendered_document_keeps_macros_defined_after_use() {
        let parser = parser();
        let spec = "Name: rubygem-%{gem_name}\n%global gem_name rails\nVersion: %{ver}\n%global ver 4.1.0\n%global other x\n";
        let meta = parser.parse(spec);
        let reparsed = parser.parse(&meta.to_document());

        assert_eq!(reparsed.full_name.as_deref(), Some("rubygem-%{gem_name}"));
        assert_eq!(reparsed.full_version.as_deref(), Some("%{ver}"));
        assert_eq!(reparsed, meta);
    }

    #[test]
    fn prefixed_name_seeds_short_name() {
        let meta = parser().parse("Name: rubygem-rack\n");
        assert_eq!(meta.short_name.as_deref(), Some("rack"));
    }

    #[test]
    fn malformed_document_yields_defaults() {
        let meta = parser().parse("%files\n\n%exclude \nRequires:\n%%%garbage\n");

        assert_eq!(meta.name, None);
        assert!(meta.requires.is_empty());
        assert_eq!(meta.files_for("").unwrap().files, vec!["%%%garbage"]);
        assert!(meta.changelog_entries.is_empty());
    }

    #[test]
    fn comment_lines_are_never_classified() {
        let meta = parser().parse("# Name: commented\n#Requires: foo\nName: real\n");

        assert_eq!(meta.name.as_deref(), Some("real"));
        assert!(meta.requires.is_empty());
    }

    #[test]
    fn section_transitions_follow_markers() {
        assert_eq!(
            Section::Preamble.on_marker(Marker::Files),
            Section::Files(None)
        );
        assert_eq!(
            Section::Files(None).on_marker(Marker::SubpackageFiles("doc".into())),
            Section::Files(Some("doc".into()))
        );
        assert_eq!(
            Section::Files(Some("doc".into())).on_marker(Marker::Files),
            Section::Files(None)
        );
        assert_eq!(
            Section::Files(None).on_marker(Marker::Changelog),
            Section::Changelog
        );
        assert_eq!(
            Section::Changelog.on_marker(Marker::Files),
            Section::Changelog
        );
    }

    #[test]
    fn rendered_document_parses_to_same_metadata() {
        let parser = parser();
        let meta = parser.parse(RAILS_SPEC);
        let reparsed = parser.parse(&meta.to_document());

        assert_eq!(reparsed.name, meta.name);
        assert_eq!(reparsed.full_name, meta.full_name);
        assert_eq!(reparsed.short_name, meta.short_name);
        assert_eq!(reparsed.full_version, meta.full_version);
        assert_eq!(reparsed.release, meta.release);
        assert_eq!(reparsed.requires, meta.requires);
        assert_eq!(reparsed.build_requires, meta.build_requires);
        assert_eq!(reparsed.subpackages, meta.subpackages);
        assert_eq!(reparsed.files, meta.files);
        assert_eq!(reparsed.changelog_entries, meta.changelog_entries);
        assert_eq!(reparsed.has_check, meta.has_check);
        assert_eq!(reparsed, meta);
    }
}
