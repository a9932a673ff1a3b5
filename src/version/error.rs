use thiserror::Error;

use crate::version::target::TargetId;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Artifact IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The backend for this target is missing or not configured
    #[error("Target {target} unavailable: {reason}")]
    Unavailable { target: TargetId, reason: String },

    #[error("Command failed: {0}")]
    Command(String),
}

impl TargetError {
    pub fn unavailable(target: TargetId, reason: impl Into<String>) -> Self {
        TargetError::Unavailable {
            target,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Fetch(#[from] TargetError),
}
