use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::version::target::{DEFAULT_TARGETS, TargetId};

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single target lookup in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Timeout for a single HTTP request in milliseconds (20 seconds)
pub const HTTP_TIMEOUT_MS: u64 = 20_000;

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("specver/", env!("CARGO_PKG_VERSION"));

/// Prefix of environment variables that override configuration
pub const ENV_PREFIX: &str = "SPECVER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unknown target: {0}")]
    InvalidTarget(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub spec: SpecConfig,
    pub targets: TargetsConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    /// Also walk development dependencies when checking
    pub devel_deps: bool,
}

/// How packaged names relate to upstream component names
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecConfig {
    /// Prefix of packaged names, `rubygem-` for `rubygem-rails`
    pub package_prefix: String,
    /// Macro holding the upstream name
    pub short_name_macro: String,
    /// Capability wrapping component requirements, `rubygem` for `rubygem(rake)`
    pub capability: String,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            package_prefix: "rubygem-".to_string(),
            short_name_macro: "gem_name".to_string(),
            capability: "rubygem".to_string(),
        }
    }
}

impl SpecConfig {
    /// Packaged name for an upstream component
    pub fn package_name(&self, name: &str) -> String {
        format!("{}{}", self.package_prefix, name)
    }
}

/// Which targets are consulted and how long each may take
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetsConfig {
    pub enabled: Vec<TargetId>,
    /// Timeout for a single target lookup in milliseconds
    pub fetch_timeout: u64,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_TARGETS.to_vec(),
            fetch_timeout: FETCH_TIMEOUT_MS,
        }
    }
}

/// Endpoints and commands each target talks to
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SourcesConfig {
    pub rubygems_url: String,
    pub fedora_mdapi_url: String,
    pub fedora_branches: Vec<String>,
    pub distgit_url: String,
    pub distgit_branch: String,
    pub bodhi_url: String,
    /// Advisory endpoint; the errata target is unavailable without it
    pub errata_url: Option<String>,
    pub koji_tags: Vec<String>,
    pub koji_command: String,
    pub dnf_command: String,
    /// Directories holding installed `.gemspec` files
    pub gem_spec_dirs: Vec<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            rubygems_url: "https://rubygems.org".to_string(),
            fedora_mdapi_url: "https://mdapi.fedoraproject.org".to_string(),
            fedora_branches: vec!["rawhide".to_string()],
            distgit_url: "https://src.fedoraproject.org".to_string(),
            distgit_branch: "rawhide".to_string(),
            bodhi_url: "https://bodhi.fedoraproject.org".to_string(),
            errata_url: None,
            koji_tags: vec!["f42".to_string()],
            koji_command: "koji".to_string(),
            dnf_command: "dnf".to_string(),
            gem_spec_dirs: vec![PathBuf::from("/usr/share/gems/specifications")],
        }
    }
}

/// Artifact cache configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Cache directory; defaults to `<data_dir>/artifacts`
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for
    /// missing fields
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(std::env::vars())
    }

    /// Apply `SPECVER_*` overrides from `vars`
    ///
    /// Unrelated variables are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "TARGETS" => self.targets.enabled = parse_targets(&value)?,
                "FETCH_TIMEOUT" => {
                    self.targets.fetch_timeout =
                        value.parse().map_err(|_| ConfigError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                        })?
                }
                "DEVEL_DEPS" => self.devel_deps = parse_bool(&key, &value)?,
                "RUBYGEMS_URL" => self.sources.rubygems_url = value,
                "FEDORA_MDAPI_URL" => self.sources.fedora_mdapi_url = value,
                "FEDORA_BRANCHES" => self.sources.fedora_branches = split_list(&value),
                "DISTGIT_URL" => self.sources.distgit_url = value,
                "DISTGIT_BRANCH" => self.sources.distgit_branch = value,
                "BODHI_URL" => self.sources.bodhi_url = value,
                "ERRATA_URL" => self.sources.errata_url = Some(value),
                "KOJI_TAGS" => self.sources.koji_tags = split_list(&value),
                "KOJI_COMMAND" => self.sources.koji_command = value,
                "DNF_COMMAND" => self.sources.dnf_command = value,
                "CACHE_DIR" => self.cache.dir = Some(PathBuf::from(value)),
                _ => {}
            }
        }
        Ok(())
    }

    /// Directory holding downloaded artifacts and their index
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .unwrap_or_else(|| data_dir().join("artifacts"))
    }
}

/// Parse a comma separated target list such as `gem,koji,fedora`
pub fn parse_targets(value: &str) -> Result<Vec<TargetId>, ConfigError> {
    split_list(value)
        .into_iter()
        .map(|name| {
            name.parse::<TargetId>()
                .map_err(|_| ConfigError::InvalidTarget(name))
        })
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Returns the path to the data directory for specver.
/// Uses $XDG_DATA_HOME/specver if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/specver,
/// or ./specver if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("specver.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("specver")
}
