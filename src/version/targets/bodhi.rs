//! Bodhi updates

use serde::Deserialize;

use crate::config::{Config, SpecConfig};
use crate::version::error::TargetError;
use crate::version::nvr::versions_matching;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::{http_client, send_json};

/// Default base URL for Fedora Bodhi
const DEFAULT_BASE_URL: &str = "https://bodhi.fedoraproject.org";

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    updates: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    #[serde(default)]
    builds: Vec<Build>,
}

#[derive(Debug, Deserialize)]
struct Build {
    nvr: String,
}

pub struct BodhiTarget {
    client: reqwest::Client,
    base_url: String,
    spec: SpecConfig,
}

impl BodhiTarget {
    pub fn new(base_url: &str, spec: SpecConfig) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sources.bodhi_url, config.spec.clone())
    }
}

impl Default for BodhiTarget {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, SpecConfig::default())
    }
}

#[async_trait::async_trait]
impl Target for BodhiTarget {
    fn id(&self) -> TargetId {
        TargetId::Bodhi
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let package = self.spec.package_name(name);
        let url = format!("{}/updates/", self.base_url);
        let request = self.client.get(&url).query(&[("packages", package.as_str())]);
        let body: UpdatesResponse = send_json(request, &url, &package).await?;

        let nvrs = body
            .updates
            .iter()
            .flat_map(|update| update.builds.iter())
            .map(|build| build.nvr.as_str());

        Ok(versions_matching(nvrs, &package)
            .into_iter()
            .map(VersionString::new)
            .collect())
    }
}
