//! Update decisions for a component given upstream and downstream versions

use serde::Serialize;

use crate::version::ordering::{VersionString, max_known};
use crate::version::requirement::{Requirement, satisfies_all};

/// What should happen to a downstream package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "version", rename_all = "snake_case")]
pub enum UpdateAction {
    /// No upstream version satisfies every requirement
    NoMatch,
    /// Matching upstream versions exist, but none is newer than downstream
    NoNewer(VersionString),
    /// Update downstream to this version
    Updatable(VersionString),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRecommendation {
    pub name: String,
    pub current_requirements: Vec<Requirement>,
    /// Upstream versions satisfying every requirement, ascending
    pub candidate_versions: Vec<VersionString>,
    /// Newest known downstream version
    pub downstream_max: Option<VersionString>,
    pub action: UpdateAction,
}

/// Decide whether `name` can be updated
///
/// `upstream` are the published versions; `downstream` the packaged ones,
/// where `unknown` entries are ignored. Upstream prereleases only count when
/// one of the requirements names a prerelease itself.
pub fn recommend(
    name: &str,
    requirements: &[Requirement],
    upstream: &[VersionString],
    downstream: &[VersionString],
) -> UpdateRecommendation {
    let allow_prerelease = requirements.iter().any(|req| req.version.is_prerelease());

    let mut candidate_versions: Vec<VersionString> = upstream
        .iter()
        .filter(|v| !v.is_unknown() && (allow_prerelease || !v.is_prerelease()))
        .filter(|v| satisfies_all(requirements, v))
        .cloned()
        .collect();
    candidate_versions.sort();
    candidate_versions.dedup();

    let downstream_max = max_known(downstream).cloned();

    let action = match (candidate_versions.last(), &downstream_max) {
        (None, _) => UpdateAction::NoMatch,
        (Some(newest), None) => UpdateAction::Updatable(newest.clone()),
        (Some(newest), Some(packaged)) if newest > packaged => {
            UpdateAction::Updatable(newest.clone())
        }
        (Some(_), Some(packaged)) => UpdateAction::NoNewer(packaged.clone()),
    };

    UpdateRecommendation {
        name: name.to_string(),
        current_requirements: requirements.to_vec(),
        candidate_versions,
        downstream_max,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::requirement::Operator;

    fn versions(list: &[&str]) -> Vec<VersionString> {
        list.iter().map(|v| VersionString::from(*v)).collect()
    }

    #[test]
    fn recommend_reports_no_match_when_upstream_cannot_satisfy() {
        let reqs = vec![Requirement::new("foo", Operator::Gte, "3.0")];

        let rec = recommend("foo", &reqs, &versions(&["1.0", "2.0"]), &[]);

        assert_eq!(rec.action, UpdateAction::NoMatch);
        assert!(rec.candidate_versions.is_empty());
        assert_eq!(rec.downstream_max, None);
    }

    #[test]
    fn recommend_lists_candidates_and_downstream_max() {
        let reqs = vec![Requirement::new("foo", Operator::Gte, "1.1")];

        let rec = recommend(
            "foo",
            &reqs,
            &versions(&["1.0", "1.2", "2.0"]),
            &versions(&["1.2"]),
        );

        assert_eq!(rec.candidate_versions, versions(&["1.2", "2.0"]));
        assert_eq!(rec.downstream_max, Some(VersionString::from("1.2")));
        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("2.0")));
    }

    #[test]
    fn recommend_prefers_final_release_over_release_candidates() {
        let reqs = vec![Requirement::new("rails", Operator::Gte, "4.0")];

        let rec = recommend(
            "rails",
            &reqs,
            &versions(&["4.0.0", "4.1.0.rc1", "4.1.0.rc2", "4.1.0"]),
            &versions(&["4.0.0"]),
        );

        assert_eq!(rec.candidate_versions, versions(&["4.0.0", "4.1.0"]));
        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("4.1.0")));
    }

    #[test]
    fn recommend_skips_prereleases_newer_than_every_release() {
        let reqs = vec![Requirement::any("rails")];

        let rec = recommend(
            "rails",
            &reqs,
            &versions(&["4.0.0", "4.1.0.rc1"]),
            &versions(&["4.0.0"]),
        );

        assert_eq!(rec.action, UpdateAction::NoNewer(VersionString::from("4.0.0")));
    }

    #[test]
    fn recommend_accepts_prereleases_when_required() {
        let reqs = vec![Requirement::new("rails", Operator::Gte, "4.1.0.rc1")];

        let rec = recommend(
            "rails",
            &reqs,
            &versions(&["4.0.0", "4.1.0.rc1", "4.1.0.rc2"]),
            &versions(&["4.0.0"]),
        );

        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("4.1.0.rc2")));
    }

    #[test]
    fn recommend_reports_no_newer_when_downstream_is_current() {
        let reqs = vec![Requirement::new("foo", Operator::Pessimistic, "1.0")];

        let rec = recommend(
            "foo",
            &reqs,
            &versions(&["1.0", "1.5", "2.0"]),
            &versions(&["1.5", "unknown"]),
        );

        assert_eq!(rec.action, UpdateAction::NoNewer(VersionString::from("1.5")));
    }

    #[test]
    fn recommend_picks_newest_matching_version() {
        let reqs = vec![
            Requirement::new("foo", Operator::Gte, "1.0"),
            Requirement::new("foo", Operator::Lt, "2.0"),
        ];

        let rec = recommend(
            "foo",
            &reqs,
            &versions(&["0.9", "1.2", "1.8", "2.1"]),
            &versions(&["1.0"]),
        );

        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("1.8")));
        assert_eq!(rec.current_requirements, reqs);
    }

    #[test]
    fn recommend_updates_when_downstream_is_only_unknown() {
        let reqs = vec![Requirement::any("foo")];

        let rec = recommend(
            "foo",
            &reqs,
            &versions(&["1.0", "1.1"]),
            &[VersionString::unknown()],
        );

        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("1.1")));
    }

    #[test]
    fn recommend_updates_when_nothing_is_packaged() {
        let rec = recommend("foo", &[], &versions(&["0.1"]), &[]);

        assert_eq!(rec.action, UpdateAction::Updatable(VersionString::from("0.1")));
    }
}
