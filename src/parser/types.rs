//! Metadata captured from a spec document

use indexmap::IndexMap;
use serde::Serialize;

use crate::parser::macros::{Macro, MacroTable};
use crate::version::requirement::Requirement;

/// Files listed for one package target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageFiles {
    pub files: Vec<String>,
    pub excludes: Vec<String>,
}

/// Everything the parser extracts from one spec document
///
/// Fields the document does not declare stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecMetadata {
    /// `Name:` as written
    pub name: Option<String>,
    /// `Name:` after macro substitution
    pub full_name: Option<String>,
    /// Upstream component name (`rails` for `rubygem-rails`)
    pub short_name: Option<String>,
    /// `Version:` as written
    pub version: Option<String>,
    /// `Version:` after macro substitution
    pub full_version: Option<String>,
    pub release: Option<String>,
    /// Top-level `Requires:` (subpackage requirements are not collected)
    pub requires: Vec<Requirement>,
    /// Top-level `BuildRequires:`
    pub build_requires: Vec<Requirement>,
    /// Names declared with `%package`, in order
    pub subpackages: Vec<String>,
    /// `%files` sections keyed by target package
    pub files: IndexMap<String, PackageFiles>,
    pub changelog_entries: Vec<String>,
    /// Whether the document has a `%check` section
    pub has_check: bool,
    pub macros: MacroTable,
}

impl SpecMetadata {
    /// Name used for the top-level `%files` section
    pub fn top_level_target(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }

    pub fn files_for(&self, target: &str) -> Option<&PackageFiles> {
        self.files.get(target)
    }

    /// Requirements on components exposed through `capability(...)`
    pub fn requires_capability<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        self.requires
            .iter()
            .filter(move |req| req.capability() == Some(capability))
    }

    /// Build requirements on components exposed through `capability(...)`
    pub fn build_requires_capability<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        self.build_requires
            .iter()
            .filter(move |req| req.capability() == Some(capability))
    }

    /// Render the captured fields back into a spec document
    ///
    /// Parsing the rendered document yields the same metadata for documents the
    /// parser fully understands, including macros defined after their first use
    /// in `Name:` or `Version:`.
    pub fn to_document(&self) -> String {
        let mut out = String::new();

        // A reference left unresolved in a header field means its definition
        // came after that field; keep it there so the reparse matches.
        let defined_after = |definition: &Macro, field: &Option<String>| {
            let reference = format!("%{{{}}}", definition.label);
            field.as_deref().is_some_and(|value| value.contains(&reference))
        };
        let stage = |definition: &Macro| {
            if defined_after(definition, &self.full_version) {
                2
            } else if defined_after(definition, &self.full_name) {
                1
            } else {
                0
            }
        };
        let push_macros = |out: &mut String, wanted: u8| {
            for definition in self.macros.iter().filter(|m| stage(m) == wanted) {
                out.push_str(&format!("%global {} {}\n", definition.label, definition.value));
            }
        };

        push_macros(&mut out, 0);
        if let Some(name) = &self.name {
            out.push_str(&format!("Name: {}\n", name));
        }
        push_macros(&mut out, 1);
        if let Some(version) = &self.version {
            out.push_str(&format!("Version: {}\n", version));
        }
        push_macros(&mut out, 2);
        if let Some(release) = &self.release {
            out.push_str(&format!("Release: {}\n", release));
        }
        for req in &self.requires {
            out.push_str(&format!("Requires: {}\n", req));
        }
        for req in &self.build_requires {
            out.push_str(&format!("BuildRequires: {}\n", req));
        }
        for subpackage in &self.subpackages {
            out.push_str(&format!("\n%package -n {}\n", subpackage));
        }
        if self.has_check {
            out.push_str("\n%check\n");
        }

        let top_level = self.top_level_target();
        for (target, files) in &self.files {
            if *target == top_level {
                out.push_str("\n%files\n");
            } else {
                out.push_str(&format!("\n%files -n {}\n", target));
            }
            for file in &files.files {
                out.push_str(&format!("{}\n", file));
            }
            for exclude in &files.excludes {
                out.push_str(&format!("%exclude {}\n", exclude));
            }
        }

        if !self.changelog_entries.is_empty() {
            out.push_str("\n%changelog\n");
            out.push_str(&self.changelog_entries.join("\n\n"));
            out.push('\n');
        }

        out
    }
}
