//! Fedora repository metadata through mdapi

use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, SpecConfig};
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};
use crate::version::targets::{get_json, http_client};

/// Default base URL for mdapi
const DEFAULT_BASE_URL: &str = "https://mdapi.fedoraproject.org";

/// Package entry returned by `/{branch}/pkg/{package}`
#[derive(Debug, Deserialize)]
struct MdapiPackage {
    version: String,
}

pub struct FedoraTarget {
    client: reqwest::Client,
    base_url: String,
    branches: Vec<String>,
    spec: SpecConfig,
}

impl FedoraTarget {
    pub fn new(base_url: &str, branches: Vec<String>, spec: SpecConfig) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            branches,
            spec,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.sources.fedora_mdapi_url,
            config.sources.fedora_branches.clone(),
            config.spec.clone(),
        )
    }
}

impl Default for FedoraTarget {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_URL,
            vec!["rawhide".to_string()],
            SpecConfig::default(),
        )
    }
}

#[async_trait::async_trait]
impl Target for FedoraTarget {
    fn id(&self) -> TargetId {
        TargetId::Fedora
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let package = self.spec.package_name(name);
        let mut versions = Vec::new();

        for branch in &self.branches {
            let url = format!("{}/{}/pkg/{}", self.base_url, branch, package);
            match get_json::<MdapiPackage>(&self.client, &url, &package).await {
                Ok(pkg) => versions.push(VersionString::new(pkg.version)),
                Err(TargetError::NotFound(_)) => {
                    debug!("{} is not in fedora {}", package, branch);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn versions_for_collects_version_per_branch() {
        let mut server = Server::new_async().await;

        let f42 = server
            .mock("GET", "/f42/pkg/rubygem-rails")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"basename": "rubygem-rails", "version": "7.0.8", "release": "1.fc42"}"#)
            .create_async()
            .await;
        let rawhide = server
            .mock("GET", "/rawhide/pkg/rubygem-rails")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"basename": "rubygem-rails", "version": "7.1.3", "release": "1.fc43"}"#)
            .create_async()
            .await;

        let target = FedoraTarget::new(
            &server.url(),
            vec!["f42".to_string(), "rawhide".to_string()],
            SpecConfig::default(),
        );
        let versions = target.versions_for("rails").await.unwrap();

        f42.assert_async().await;
        rawhide.assert_async().await;
        assert_eq!(
            versions,
            vec![VersionString::from("7.0.8"), VersionString::from("7.1.3")]
        );
    }

    #[tokio::test]
    async fn versions_for_skips_branches_without_package() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("GET", "/rawhide/pkg/rubygem-nonexistent")
            .with_status(404)
            .create_async()
            .await;

        let target = FedoraTarget::new(
            &server.url(),
            vec!["rawhide".to_string()],
            SpecConfig::default(),
        );
        let versions = target.versions_for("nonexistent").await.unwrap();

        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn versions_for_returns_error_on_server_failure() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("GET", "/rawhide/pkg/rubygem-rails")
            .with_status(500)
            .create_async()
            .await;

        let target = FedoraTarget::new(
            &server.url(),
            vec!["rawhide".to_string()],
            SpecConfig::default(),
        );
        let result = target.versions_for("rails").await;

        assert!(matches!(result, Err(TargetError::InvalidResponse(_))));
    }
}
