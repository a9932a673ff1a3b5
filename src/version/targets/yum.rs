//! Enabled dnf/yum repositories, queried with `dnf repoquery`

use crate::config::{Config, SpecConfig};
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::command::{output_lines, run};

pub struct YumTarget {
    command: String,
    spec: SpecConfig,
}

impl YumTarget {
    pub fn new(command: &str, spec: SpecConfig) -> Self {
        Self {
            command: command.to_string(),
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sources.dnf_command, config.spec.clone())
    }
}

#[async_trait::async_trait]
impl Target for YumTarget {
    fn id(&self) -> TargetId {
        TargetId::Yum
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let package = self.spec.package_name(name);
        let stdout = run(
            TargetId::Yum,
            &self.command,
            &[
                "repoquery",
                "--quiet",
                "--latest-limit",
                "1",
                "--queryformat",
                "%{version}\n",
                &package,
            ],
        )
        .await?;

        Ok(output_lines(&stdout).map(VersionString::from).collect())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::version::targets::command::test_support::fake_command;
    use tempfile::TempDir;

    #[tokio::test]
    async fn versions_for_returns_repoquery_output() {
        let dir = TempDir::new().unwrap();
        let dnf = fake_command(dir.path(), "dnf", "4.0.0\n", 0);
        let target = YumTarget::new(dnf.to_str().unwrap(), SpecConfig::default());

        let versions = target.versions_for("rails").await.unwrap();

        assert_eq!(versions, vec![VersionString::from("4.0.0")]);
    }

    #[tokio::test]
    async fn versions_for_returns_empty_when_package_is_not_in_repos() {
        let dir = TempDir::new().unwrap();
        let dnf = fake_command(dir.path(), "dnf", "", 0);
        let target = YumTarget::new(dnf.to_str().unwrap(), SpecConfig::default());

        let versions = target.versions_for("nonexistent").await.unwrap();

        assert!(versions.is_empty());
    }
}
