//! Locally installed gems, found by their installed `.gemspec` files

use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::version::error::TargetError;
use crate::version::ordering::VersionString;
use crate::version::target::{Target, TargetId};

pub struct LocalGemTarget {
    spec_dirs: Vec<PathBuf>,
}

impl LocalGemTarget {
    pub fn new(spec_dirs: Vec<PathBuf>) -> Self {
        Self { spec_dirs }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sources.gem_spec_dirs.clone())
    }
}

/// Version from a `<name>-<version>.gemspec` file name, if it belongs to `name`
fn version_from_file_name(file_name: &str, name: &str) -> Option<String> {
    let version = file_name
        .strip_suffix(".gemspec")?
        .strip_prefix(name)?
        .strip_prefix('-')?;

    // `rails-html-sanitizer-1.0.gemspec` is not a `rails` gemspec
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| version.to_string())
}

#[async_trait::async_trait]
impl Target for LocalGemTarget {
    fn id(&self) -> TargetId {
        TargetId::Gem
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        let mut versions = Vec::new();
        let mut scanned = 0;

        for dir in &self.spec_dirs {
            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Skipping gem spec dir {}: {}", dir.display(), e);
                    continue;
                }
            };
            scanned += 1;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| TargetError::InvalidResponse(e.to_string()))?
            {
                let file_name = entry.file_name();
                if let Some(version) = version_from_file_name(&file_name.to_string_lossy(), name)
                {
                    versions.push(VersionString::new(version));
                }
            }
        }

        if scanned == 0 {
            return Err(TargetError::unavailable(
                TargetId::Gem,
                "no gem specification directory found",
            ));
        }

        versions.sort();
        Ok(versions)
    }
}
