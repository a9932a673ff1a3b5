//! Finds requirements downstream cannot satisfy and decides what to update

use std::collections::HashMap;

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::component::Component;
use crate::version::checker::{TargetResult, VersionChecker, all_versions, matching_in};
use crate::version::ordering::VersionString;
use crate::version::requirement::Requirement;
use crate::version::target::{ComponentSource, Target};
use crate::version::tree::{TreeOptions, dependency_tree};
use crate::version::update::{UpdateRecommendation, recommend};

/// Target lookups remembered for one check run
#[derive(Default)]
pub struct LookupMemo {
    results: HashMap<String, TargetResult>,
}

impl LookupMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Versions of `name`, asking the checker only the first time
    pub async fn versions_for(&mut self, checker: &VersionChecker, name: &str) -> &TargetResult {
        if !self.results.contains_key(name) {
            let result = checker.versions_for(name, None).await;
            self.results.insert(name.to_string(), result);
        }
        &self.results[name]
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Requirements that need attention, grouped by component name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MissingDeps {
    /// Recorded requirements per name, without duplicates
    pub deps: IndexMap<String, Vec<Requirement>>,
    /// Every downstream version known for each recorded name
    pub alts: IndexMap<String, Vec<VersionString>>,
}

impl MissingDeps {
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Record `requirement` when downstream has no match for it, or when
    /// another requirement on the same name is already recorded
    pub fn observe(&mut self, requirement: &Requirement, downstream: &TargetResult) {
        let name = requirement.component_name();
        let missing_downstream = matching_in(downstream, requirement).is_empty();
        let other_recorded = self.deps.contains_key(name);

        if !(missing_downstream || other_recorded) {
            return;
        }

        let recorded = self.deps.entry(name.to_string()).or_default();
        if !recorded.contains(requirement) {
            recorded.push(requirement.clone());
        }
        self.alts
            .entry(name.to_string())
            .or_insert_with(|| all_versions(downstream));
    }
}

/// Walk the dependencies of `root` and record every requirement downstream
/// cannot satisfy
pub async fn collect_missing(
    checker: &VersionChecker,
    source: &dyn ComponentSource,
    root: &Component,
    options: TreeOptions,
    memo: &mut LookupMemo,
) -> MissingDeps {
    let mut requirements = Vec::new();
    dependency_tree(source, root, options, |_, req, _| {
        requirements.push(req.clone());
    })
    .await;
    debug!(
        "{} requirements reachable from {}",
        requirements.len(),
        root.name
    );

    let mut missing = MissingDeps::default();
    for req in &requirements {
        let downstream = memo.versions_for(checker, req.component_name()).await;
        missing.observe(req, downstream);
    }
    missing
}

/// Decide, for each recorded name, whether an upstream version can be packaged
pub async fn recommend_updates(
    upstream: &dyn Target,
    missing: &MissingDeps,
) -> Vec<UpdateRecommendation> {
    let lookups = missing.deps.keys().map(|name| async move {
        upstream
            .versions_for(name)
            .await
            .inspect_err(|e| warn!("Failed to fetch upstream versions of {}: {}", name, e))
            .unwrap_or_default()
    });
    let upstream_versions = join_all(lookups).await;

    missing
        .deps
        .iter()
        .zip(upstream_versions)
        .map(|((name, requirements), versions)| {
            let downstream = missing.alts.get(name).map(Vec::as_slice).unwrap_or(&[]);
            recommend(name, requirements, &versions, downstream)
        })
        .collect()
}

/// Full check: collect unsatisfied requirements, then recommend updates
pub async fn check(
    checker: &VersionChecker,
    source: &dyn ComponentSource,
    upstream: &dyn Target,
    root: &Component,
    options: TreeOptions,
) -> Vec<UpdateRecommendation> {
    let mut memo = LookupMemo::new();
    let missing = collect_missing(checker, source, root, options, &mut memo).await;
    info!(
        "{} of {} looked up components need attention",
        missing.deps.len(),
        memo.len()
    );
    recommend_updates(upstream, &missing).await
}
