//! Target implementations for fetching versions from each source

pub mod bodhi;
pub mod command;
pub mod distgit;
pub mod errata;
pub mod fedora;
pub mod koji;
pub mod local_gem;
pub mod rubygems;
pub mod yum;

pub use bodhi::BodhiTarget;
pub use distgit::DistGitTarget;
pub use errata::ErrataTarget;
pub use fedora::FedoraTarget;
pub use koji::KojiTarget;
pub use local_gem::LocalGemTarget;
pub use rubygems::RubyGemsRegistry;
pub use yum::YumTarget;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::{Config, HTTP_TIMEOUT_MS, USER_AGENT};
use crate::version::error::TargetError;
use crate::version::target::{Target, TargetId};

/// Shared HTTP client settings for every HTTP-backed target
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_millis(HTTP_TIMEOUT_MS))
        .build()
        .expect("Failed to create HTTP client")
}

/// GET `url` and decode the JSON body
///
/// 404 maps to `NotFound(package)`, any other non-success status to
/// `InvalidResponse`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    package: &str,
) -> Result<T, TargetError> {
    send_json(client.get(url), url, package).await
}

/// Send a prepared request and decode the JSON body, mapping status like
/// [`get_json`]
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
    package: &str,
) -> Result<T, TargetError> {
    let response = request.send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(TargetError::NotFound(package.to_string()));
    }

    if !status.is_success() {
        warn!("{} returned status {}", url, status);
        return Err(TargetError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    response.json().await.map_err(|e| {
        warn!("Failed to parse response from {}: {}", url, e);
        TargetError::InvalidResponse(e.to_string())
    })
}

/// Build one target per id, in the given order
pub fn build_target(id: TargetId, config: &Config) -> Arc<dyn Target> {
    match id {
        TargetId::Gem => Arc::new(LocalGemTarget::from_config(config)),
        TargetId::Koji => Arc::new(KojiTarget::from_config(config)),
        TargetId::Fedora => Arc::new(FedoraTarget::from_config(config)),
        TargetId::Git => Arc::new(DistGitTarget::from_config(config)),
        TargetId::Yum => Arc::new(YumTarget::from_config(config)),
        TargetId::Bodhi => Arc::new(BodhiTarget::from_config(config)),
        TargetId::Errata => Arc::new(ErrataTarget::from_config(config)),
        TargetId::Upstream => Arc::new(RubyGemsRegistry::new(&config.sources.rubygems_url)),
    }
}

/// Targets enabled by `config`, duplicates removed
pub fn build_targets(config: &Config) -> Vec<Arc<dyn Target>> {
    let mut seen = Vec::new();
    config
        .targets
        .enabled
        .iter()
        .copied()
        .filter(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        })
        .map(|id| build_target(id, config))
        .collect()
}
