//! Target trait for fetching known versions of a component from one source

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;

/// Identifier of a version source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    /// Locally installed gems
    Gem,
    /// Koji build system tags
    Koji,
    /// Fedora repository metadata (mdapi)
    Fedora,
    /// Packaged spec in dist-git
    Git,
    /// Enabled dnf/yum repositories
    Yum,
    /// Bodhi updates
    Bodhi,
    /// Errata tool advisory builds
    Errata,
    /// Upstream rubygems.org
    Upstream,
}

/// Targets checked when the configuration does not say otherwise
pub const DEFAULT_TARGETS: &[TargetId] = &[
    TargetId::Gem,
    TargetId::Koji,
    TargetId::Fedora,
    TargetId::Git,
    TargetId::Yum,
];

impl TargetId {
    pub const ALL: &'static [TargetId] = &[
        TargetId::Gem,
        TargetId::Koji,
        TargetId::Fedora,
        TargetId::Git,
        TargetId::Yum,
        TargetId::Bodhi,
        TargetId::Errata,
        TargetId::Upstream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetId::Gem => "gem",
            TargetId::Koji => "koji",
            TargetId::Fedora => "fedora",
            TargetId::Git => "git",
            TargetId::Yum => "yum",
            TargetId::Bodhi => "bodhi",
            TargetId::Errata => "errata",
            TargetId::Upstream => "upstream",
        }
    }
}

impl FromStr for TargetId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or(())
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback notified with every answer a target gives, including `unknown`
pub type VersionObserver<'a> = &'a (dyn Fn(TargetId, &str, &[VersionString]) + Send + Sync);

/// Trait for fetching known versions of a component from one target
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Target: Send + Sync {
    /// Returns which target this implementation answers for
    fn id(&self) -> TargetId;

    /// Fetches every version of `name` this target knows about
    ///
    /// An empty list means the target answered but has no versions; failures
    /// are reported as errors and turned into `unknown` by the caller.
    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError>;
}

/// Canonical source of component metadata, used to walk dependencies
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ComponentSource: Send + Sync {
    /// Fetches the metadata (including dependencies) of the latest `name`
    async fn retrieve(&self, name: &str) -> Result<Component, TargetError>;
}

/// Origin of downloadable component artifacts
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn download(&self, name: &str, version: &str) -> Result<Vec<u8>, TargetError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gem", Ok(TargetId::Gem))]
    #[case("koji", Ok(TargetId::Koji))]
    #[case(" errata ", Ok(TargetId::Errata))]
    #[case("upstream", Ok(TargetId::Upstream))]
    #[case("rubygems", Err(()))]
    fn target_id_from_str(#[case] input: &str, #[case] expected: Result<TargetId, ()>) {
        assert_eq!(input.parse::<TargetId>(), expected);
    }

    #[test]
    fn default_targets_exclude_bodhi_errata_and_upstream() {
        assert!(!DEFAULT_TARGETS.contains(&TargetId::Bodhi));
        assert!(!DEFAULT_TARGETS.contains(&TargetId::Errata));
        assert!(!DEFAULT_TARGETS.contains(&TargetId::Upstream));
        assert_eq!(DEFAULT_TARGETS.len(), 5);
    }

    #[test]
    fn target_id_round_trips_through_display() {
        for id in TargetId::ALL {
            assert_eq!(id.to_string().parse::<TargetId>(), Ok(*id));
        }
    }
}
