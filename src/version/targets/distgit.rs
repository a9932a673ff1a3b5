//! Packaged spec files in dist-git

use tracing::{debug, warn};

use crate::config::{Config, SpecConfig};
use crate::parser::spec::SpecParser;
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::http_client;

/// Default base URL for Fedora dist-git
const DEFAULT_BASE_URL: &str = "https://src.fedoraproject.org";

pub struct DistGitTarget {
    client: reqwest::Client,
    base_url: String,
    branch: String,
    spec: SpecConfig,
    parser: SpecParser,
}

impl DistGitTarget {
    pub fn new(base_url: &str, branch: &str, spec: SpecConfig) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            branch: branch.to_string(),
            parser: SpecParser::new(&spec),
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.sources.distgit_url,
            &config.sources.distgit_branch,
            config.spec.clone(),
        )
    }

    fn spec_url(&self, package: &str) -> String {
        format!(
            "{}/rpms/{}/raw/{}/f/{}.spec",
            self.base_url, package, self.branch, package
        )
    }
}

impl Default for DistGitTarget {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, "rawhide", SpecConfig::default())
    }
}

#[async_trait::async_trait]
impl Target for DistGitTarget {
    fn id(&self) -> TargetId {
        TargetId::Git
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let package = self.spec.package_name(name);
        let url = self.spec_url(&package);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("No {} spec on dist-git branch {}", package, self.branch);
            return Ok(Vec::new());
        }

        if !status.is_success() {
            warn!("dist-git returned status {}: {}", status, url);
            return Err(TargetError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let content = response.text().await?;
        let meta = self.parser.parse(&content);

        Ok(meta
            .full_version
            .map(VersionString::new)
            .into_iter()
            .collect())
    }
}
