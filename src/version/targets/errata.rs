//! Builds attached to an errata tool advisory

use indexmap::IndexMap;

use crate::config::{Config, SpecConfig};
use crate::version::error::TargetError;
use crate::version::nvr::versions_matching;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::{get_json, http_client};

/// `/builds` response: product tag to a list of `{ nvr: details }` maps
type AdvisoryBuilds = IndexMap<String, Vec<IndexMap<String, serde_json::Value>>>;

pub struct ErrataTarget {
    client: reqwest::Client,
    advisory_url: Option<String>,
    spec: SpecConfig,
}

impl ErrataTarget {
    pub fn new(advisory_url: Option<&str>, spec: SpecConfig) -> Self {
        Self {
            client: http_client(),
            advisory_url: advisory_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sources.errata_url.as_deref(), config.spec.clone())
    }
}

#[async_trait::async_trait]
impl Target for ErrataTarget {
    fn id(&self) -> TargetId {
        TargetId::Errata
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let Some(advisory_url) = &self.advisory_url else {
            return Err(TargetError::unavailable(
                TargetId::Errata,
                "no advisory URL configured",
            ));
        };

        let package = self.spec.package_name(name);
        let url = format!("{}/builds", advisory_url);
        let builds: AdvisoryBuilds = get_json(&self.client, &url, &package).await?;

        let nvrs = builds
            .values()
            .flatten()
            .flat_map(|build| build.keys())
            .map(String::as_str);

        Ok(versions_matching(nvrs, &package)
            .into_iter()
            .map(VersionString::new)
            .collect())
    }
}
