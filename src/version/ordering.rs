//! Segment-wise version ordering
//!
//! Versions are compared the way RPM compares them: the string is split into
//! runs of digits and runs of letters, everything else is a separator.
//!
//! - numeric runs compare numerically (`1.9 < 1.10`), leading zeros are ignored
//! - alphabetic runs compare lexically (`1.0.alpha < 1.0.beta`)
//! - a numeric run is newer than an alphabetic run (`1.0.1 > 1.0.rc1`)
//! - a version that ends early is padded with zeros, so `1.0 == 1.0.0` and a
//!   letter run past the end marks a prerelease (`1.0.rc1 < 1.0`)

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Placeholder reported for a target that could not answer
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment<'a> {
    /// Digits with leading zeros stripped
    Numeric(&'a str),
    Alpha(&'a str),
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Longer digit run is the bigger number once zeros are stripped
            (Segment::Numeric(a), Segment::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Alpha(a), Segment::Alpha(b)) => a.cmp(b),
            (Segment::Numeric(_), Segment::Alpha(_)) => Ordering::Greater,
            (Segment::Alpha(_), Segment::Numeric(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(version: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let bytes = version.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let digits = version[start..i].trim_start_matches('0');
            result.push(Segment::Numeric(digits));
        } else if bytes[i].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            result.push(Segment::Alpha(&version[start..i]));
        } else {
            i += 1;
        }
    }

    result
}

/// Segments with trailing zeros dropped; equal versions share this form
fn canonical_segments(version: &str) -> Vec<Segment<'_>> {
    let mut result = segments(version);
    while result.last() == Some(&Segment::Numeric("")) {
        result.pop();
    }
    result
}

/// Compare two raw version strings segment by segment
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (segments(a), segments(b));
    let zero = Segment::Numeric("");

    (0..a.len().max(b.len()))
        .map(|i| {
            let left = a.get(i).unwrap_or(&zero);
            let right = b.get(i).unwrap_or(&zero);
            left.cmp(right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Whether the version carries a letter run (`4.1.0.rc1`, `2.0.beta`)
pub fn is_prerelease(version: &str) -> bool {
    segments(version)
        .iter()
        .any(|s| matches!(s, Segment::Alpha(_)))
}

/// Numeric release components up to the first non-numeric segment
///
/// `"1.2.3.rc1"` yields `[1, 2, 3]`. Used to compute pessimistic upper bounds.
pub fn numeric_release(version: &str) -> Vec<u64> {
    segments(version)
        .into_iter()
        .map_while(|s| match s {
            Segment::Numeric(d) if d.is_empty() => Some(0),
            Segment::Numeric(d) => d.parse().ok(),
            Segment::Alpha(_) => None,
        })
        .collect()
}

/// A version as reported by a spec document or a target
///
/// Equality and hashing follow the segment ordering, so `1.0`, `1-0` and
/// `1.0.0` are the same version. Use [`VersionString::as_str`] when the literal text matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionString(String);

impl VersionString {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The sentinel for "target could not answer"
    pub fn unknown() -> Self {
        Self(UNKNOWN_VERSION.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_VERSION
    }

    pub fn is_prerelease(&self) -> bool {
        !self.is_unknown() && is_prerelease(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Ord for VersionString {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.0, &other.0)
    }
}

impl PartialOrd for VersionString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionString {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionString {}

impl Hash for VersionString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_segments(&self.0).hash(state);
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VersionString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Highest known version in the list, ignoring the `unknown` sentinel
pub fn max_known<'a, I>(versions: I) -> Option<&'a VersionString>
where
    I: IntoIterator<Item = &'a VersionString>,
{
    versions.into_iter().filter(|v| !v.is_unknown()).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "1.0.0", Ordering::Equal)]
    #[case("1.0.0", "2.0.0", Ordering::Less)]
    #[case("1.9.0", "1.10.0", Ordering::Less)]
    #[case("10.0", "9.9.9", Ordering::Greater)]
    #[case("1.0", "1.0.0", Ordering::Equal)]
    #[case("1", "1.0.0.0", Ordering::Equal)]
    #[case("1.0.0", "1.0.0.1", Ordering::Less)]
    #[case("1.0", "1-0", Ordering::Equal)]
    #[case("1.01", "1.1", Ordering::Equal)]
    #[case("1.0.alpha", "1.0.beta", Ordering::Less)]
    #[case("1.0.1", "1.0.rc1", Ordering::Greater)]
    #[case("4.0.0.rc1", "4.0.0", Ordering::Less)]
    #[case("4.1.0.rc2", "4.1.0", Ordering::Less)]
    #[case("4.1.0.rc1", "4.1.0.rc2", Ordering::Less)]
    #[case("4.1.0.rc1", "4.0.9", Ordering::Greater)]
    #[case("1.0.rc1", "1", Ordering::Less)]
    #[case("123456789012345678901234567890", "9", Ordering::Greater)]
    fn compare_versions_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_versions(a, b), expected);
        assert_eq!(compare_versions(b, a), expected.reverse());
    }

    #[rstest]
    #[case("1.2.3", vec![1, 2, 3])]
    #[case("1.2.rc1", vec![1, 2])]
    #[case("0.10", vec![0, 10])]
    #[case("rc", vec![])]
    fn numeric_release_stops_at_first_alpha(#[case] version: &str, #[case] expected: Vec<u64>) {
        assert_eq!(numeric_release(version), expected);
    }

    #[test]
    fn version_string_sorts_by_segments() {
        let mut versions: Vec<VersionString> = ["2.0", "1.10", "1.9", "1.0.rc1", "1.0"]
            .into_iter()
            .map(VersionString::from)
            .collect();
        versions.sort();

        let sorted: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(sorted, vec!["1.0.rc1", "1.0", "1.9", "1.10", "2.0"]);
    }

    #[test]
    fn trailing_zeros_hash_alike() {
        use std::collections::HashSet;

        let set: HashSet<VersionString> = ["1.0", "1.0.0", "1"].into_iter().map(Into::into).collect();
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    #[case("4.1.0.rc1", true)]
    #[case("2.0.beta", true)]
    #[case("4.1.0", false)]
    #[case("unknown", false)]
    fn is_prerelease_detects_letter_runs(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(VersionString::from(version).is_prerelease(), expected);
    }

    #[test]
    fn max_of_max_is_idempotent() {
        let versions: Vec<VersionString> = ["1.0", "3.1", "2.7"].into_iter().map(Into::into).collect();
        let max = max_known(&versions).cloned().unwrap();
        let again = max_known(std::slice::from_ref(&max)).cloned().unwrap();
        assert_eq!(max, again);
        assert_eq!(max.as_str(), "3.1");
    }

    #[test]
    fn max_known_skips_unknown_sentinel() {
        let versions = vec![VersionString::unknown(), VersionString::from("0.1")];
        assert_eq!(max_known(&versions).map(|v| v.as_str()), Some("0.1"));

        let only_unknown = vec![VersionString::unknown()];
        assert_eq!(max_known(&only_unknown), None);
    }

    #[test]
    fn unknown_sentinel_is_distinct_from_versions() {
        assert!(VersionString::unknown().is_unknown());
        assert!(!VersionString::from("1.0").is_unknown());
    }
}
