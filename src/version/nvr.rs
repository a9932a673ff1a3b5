//! Build identifiers in `name-version-release` form

/// A build identifier split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nvr<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub release: &'a str,
}

impl<'a> Nvr<'a> {
    /// Split `rubygem-rails-4.1.0-1.fc21` into name, version and release
    ///
    /// The name may itself contain dashes, so the split happens from the right.
    pub fn parse(nvr: &'a str) -> Option<Self> {
        let mut parts = nvr.trim().rsplitn(3, '-');
        let release = parts.next()?;
        let version = parts.next()?;
        let name = parts.next()?;

        if name.is_empty() || version.is_empty() || release.is_empty() {
            return None;
        }

        Some(Self {
            name,
            version,
            release,
        })
    }
}

/// Versions of every build in `nvrs` whose name is exactly `package`
pub fn versions_matching<'a, I>(nvrs: I, package: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    nvrs.into_iter()
        .filter_map(Nvr::parse)
        .filter(|nvr| nvr.name == package)
        .map(|nvr| nvr.version.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rubygem-rails-4.1.0-1.fc21", Some(("rubygem-rails", "4.1.0", "1.fc21")))]
    #[case("rubygem-active-support-4.1.0-2.el7", Some(("rubygem-active-support", "4.1.0", "2.el7")))]
    #[case("foo-1.0", None)]
    #[case("-1.0-1", None)]
    fn parse_splits_from_the_right(#[case] input: &str, #[case] expected: Option<(&str, &str, &str)>) {
        let parsed = Nvr::parse(input).map(|nvr| (nvr.name, nvr.version, nvr.release));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn versions_matching_filters_by_exact_name() {
        let builds = [
            "rubygem-rails-4.1.0-1.fc21",
            "rubygem-railties-4.1.0-1.fc21",
            "rubygem-rails-4.0.2-3.fc20",
        ];

        assert_eq!(
            versions_matching(builds, "rubygem-rails"),
            vec!["4.1.0".to_string(), "4.0.2".to_string()]
        );
    }
}
