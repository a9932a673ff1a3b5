//! rubygems.org API implementation
//!
//! Serves three roles: the `upstream` version target, the source of component
//! metadata for dependency walks, and the origin of `.gem` artifacts.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::component::Component;
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::requirement::Requirement;
use crate::version::target::{ArtifactSource, ComponentSource, Target, TargetId};
use crate::version::targets::{get_json, http_client};

/// Default base URL for rubygems.org
const DEFAULT_BASE_URL: &str = "https://rubygems.org";

/// Entry of `/api/v1/versions/{name}.json`
#[derive(Debug, Deserialize)]
struct VersionEntry {
    number: String,
}

/// Response of `/api/v1/gems/{name}.json`
#[derive(Debug, Deserialize)]
struct GemInfo {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: GemDependencies,
}

#[derive(Debug, Default, Deserialize)]
struct GemDependencies {
    #[serde(default)]
    runtime: Vec<GemDependency>,
    #[serde(default)]
    development: Vec<GemDependency>,
}

#[derive(Debug, Deserialize)]
struct GemDependency {
    name: String,
    #[serde(default)]
    requirements: String,
}

fn expand(deps: &[GemDependency]) -> Vec<Requirement> {
    deps.iter()
        .flat_map(|dep| Requirement::parse_list(&dep.name, &dep.requirements))
        .collect()
}

impl From<GemInfo> for Component {
    fn from(info: GemInfo) -> Self {
        Component::new(info.name)
            .with_version(info.version)
            .with_deps(expand(&info.dependencies.runtime))
            .with_dev_deps(expand(&info.dependencies.development))
    }
}

pub struct RubyGemsRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl RubyGemsRegistry {
    /// Creates a new RubyGemsRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for RubyGemsRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Target for RubyGemsRegistry {
    fn id(&self) -> TargetId {
        TargetId::Upstream
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let url = format!("{}/api/v1/versions/{}.json", self.base_url, name);
        let entries: Vec<VersionEntry> = get_json(&self.client, &url, name).await?;

        let mut versions: Vec<VersionString> = entries
            .into_iter()
            .map(|entry| VersionString::new(entry.number))
            .collect();
        versions.sort();
        versions.dedup();

        Ok(versions)
    }
}

#[async_trait::async_trait]
impl ComponentSource for RubyGemsRegistry {
    async fn retrieve(&self, name: &str) -> Result<Component, TargetError> {
        let url = format!("{}/api/v1/gems/{}.json", self.base_url, name);
        let info: GemInfo = get_json(&self.client, &url, name).await?;
        debug!("Retrieved {} {} from rubygems", info.name, info.version);
        Ok(info.into())
    }
}

#[async_trait::async_trait]
impl ArtifactSource for RubyGemsRegistry {
    async fn download(&self, name: &str, version: &str) -> Result<Vec<u8>, TargetError> {
        let url = format!("{}/gems/{}-{}.gem", self.base_url, name, version);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TargetError::NotFound(format!("{}-{}", name, version)));
        }

        if !status.is_success() {
            warn!("rubygems returned status {}: {}", status, url);
            return Err(TargetError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
