//! Version reconciliation across targets

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::requirement::Requirement;
use crate::version::target::{Target, TargetId, VersionObserver};
use crate::version::targets::build_targets;

/// Versions reported by each target, in enabled-target order
///
/// A target that could not answer maps to `[unknown]`; one that answered with
/// nothing maps to an empty list.
pub type TargetResult = IndexMap<TargetId, Vec<VersionString>>;

pub struct VersionChecker {
    targets: Vec<Arc<dyn Target>>,
    timeout: Duration,
}

impl VersionChecker {
    pub fn new(targets: Vec<Arc<dyn Target>>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            build_targets(config),
            Duration::from_millis(config.targets.fetch_timeout),
        )
    }

    pub fn target_ids(&self) -> Vec<TargetId> {
        self.targets.iter().map(|target| target.id()).collect()
    }

    /// Ask every enabled target for the versions of `name`
    ///
    /// Targets are queried concurrently and each is bounded by the fetch
    /// timeout. Failures never propagate: they become `[unknown]`.
    pub async fn versions_for(
        &self,
        name: &str,
        observer: Option<VersionObserver<'_>>,
    ) -> TargetResult {
        let lookups = self.targets.iter().map(|target| async move {
            let id = target.id();
            let versions = match tokio::time::timeout(self.timeout, target.versions_for(name)).await
            {
                Ok(Ok(versions)) => {
                    debug!("{} reports {} versions of {}", id, versions.len(), name);
                    versions
                }
                Ok(Err(e @ TargetError::Unavailable { .. })) => {
                    debug!("{}", e);
                    vec![VersionString::unknown()]
                }
                Ok(Err(e)) => {
                    warn!("Failed to fetch {} versions of {}: {}", id, name, e);
                    vec![VersionString::unknown()]
                }
                Err(_) => {
                    warn!(
                        "Timed out after {:?} fetching {} versions of {}",
                        self.timeout, id, name
                    );
                    vec![VersionString::unknown()]
                }
            };
            (id, versions)
        });

        let mut result = TargetResult::new();
        for (id, versions) in join_all(lookups).await {
            if let Some(observer) = observer {
                observer(id, name, &versions);
            }
            result.insert(id, versions);
        }
        result
    }

    /// One representative version of `name` per target
    pub async fn version_for(&self, name: &str) -> IndexMap<TargetId, VersionString> {
        per_target_versions(&self.versions_for(name, None).await)
    }

    /// One representative version of `name` across every target
    pub async fn version_of(&self, name: &str) -> VersionString {
        overall_version(&self.versions_for(name, None).await)
    }

    /// Every known version satisfying `requirement`, ascending
    pub async fn matching_versions(&self, requirement: &Requirement) -> Vec<VersionString> {
        let result = self
            .versions_for(requirement.component_name(), None)
            .await;
        matching_in(&result, requirement)
    }
}

/// Most frequent version, ties broken by the highest version
pub fn most_frequent<'a, I>(versions: I) -> Option<VersionString>
where
    I: IntoIterator<Item = &'a VersionString>,
{
    let mut counts: HashMap<&VersionString, usize> = HashMap::new();
    for version in versions {
        *counts.entry(version).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| a.cmp(b)))
        .map(|(version, _)| version.clone())
}

/// Collapse each target's list to its most frequent version
///
/// Targets that answered with an empty list are left out.
pub fn per_target_versions(result: &TargetResult) -> IndexMap<TargetId, VersionString> {
    result
        .iter()
        .filter_map(|(id, versions)| most_frequent(versions).map(|version| (*id, version)))
        .collect()
}

/// Collapse the per-target versions into one, `unknown` when nothing is known
pub fn overall_version(result: &TargetResult) -> VersionString {
    let per_target = per_target_versions(result);
    most_frequent(per_target.values().filter(|v| !v.is_unknown()))
        .unwrap_or_else(VersionString::unknown)
}

/// Known versions in `result` satisfying `requirement`, ascending and deduplicated
pub fn matching_in(result: &TargetResult, requirement: &Requirement) -> Vec<VersionString> {
    let mut matching: Vec<VersionString> = result
        .values()
        .flatten()
        .filter(|v| !v.is_unknown() && requirement.satisfied_by(v))
        .cloned()
        .collect();
    matching.sort();
    matching.dedup();
    matching
}

/// Every version in `result`, `unknown` included, in target order
pub fn all_versions(result: &TargetResult) -> Vec<VersionString> {
    result.values().flatten().cloned().collect()
}
