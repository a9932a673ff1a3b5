//! Koji build tags, queried through the `koji` command line client

use tracing::debug;

use crate::config::{Config, SpecConfig};
use crate::version::error::TargetError;
use crate::version::nvr::versions_matching;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::command::{output_lines, run};

pub struct KojiTarget {
    command: String,
    tags: Vec<String>,
    spec: SpecConfig,
}

impl KojiTarget {
    pub fn new(command: &str, tags: Vec<String>, spec: SpecConfig) -> Self {
        Self {
            command: command.to_string(),
            tags,
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.sources.koji_command,
            config.sources.koji_tags.clone(),
            config.spec.clone(),
        )
    }
}

#[async_trait::async_trait]
impl Target for KojiTarget {
    fn id(&self) -> TargetId {
        TargetId::Koji
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let package = self.spec.package_name(name);
        let mut versions = Vec::new();

        for tag in &self.tags {
            let stdout = run(
                TargetId::Koji,
                &self.command,
                &["list-tagged", "--latest", "--quiet", tag, &package],
            )
            .await?;

            // Each line is `<nvr> <tag> <owner>`
            let nvrs = output_lines(&stdout).filter_map(|line| line.split_whitespace().next());
            let found = versions_matching(nvrs, &package);
            debug!("koji tag {} has {:?} for {}", tag, found, package);
            versions.extend(found.into_iter().map(VersionString::from));
        }

        Ok(versions)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::version::targets::command::test_support::fake_command;
    use tempfile::TempDir;

    #[tokio::test]
    async fn versions_for_extracts_versions_from_tagged_builds() {
        let dir = TempDir::new().unwrap();
        let koji = fake_command(
            dir.path(),
            "koji",
            "rubygem-rails-4.1.0-1.fc42  f42  jdoe\nrubygem-rails-doc-4.1.0-1.fc42  f42  jdoe",
            0,
        );
        let target = KojiTarget::new(
            koji.to_str().unwrap(),
            vec!["f42".to_string()],
            SpecConfig::default(),
        );

        let versions = target.versions_for("rails").await.unwrap();

        assert_eq!(versions, vec![VersionString::from("4.1.0")]);
    }

    #[tokio::test]
    async fn versions_for_queries_every_tag() {
        let dir = TempDir::new().unwrap();
        let koji = fake_command(dir.path(), "koji", "rubygem-rack-1.5.2-1.fc42 f42 jdoe", 0);
        let target = KojiTarget::new(
            koji.to_str().unwrap(),
            vec!["f41".to_string(), "f42".to_string()],
            SpecConfig::default(),
        );

        let versions = target.versions_for("rack").await.unwrap();

        assert_eq!(versions.len(), 2);
    }

    #[tokio::test]
    async fn versions_for_is_unavailable_without_koji_binary() {
        let target = KojiTarget::new(
            "/nonexistent/koji",
            vec!["f42".to_string()],
            SpecConfig::default(),
        );

        let result = target.versions_for("rails").await;

        assert!(matches!(result, Err(TargetError::Unavailable { .. })));
    }
}
