//! Target test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use specver::component::Component;
use specver::version::checker::VersionChecker;
use specver::version::error::TargetError;
use specver::version::ordering::VersionString;
use specver::version::target::{ComponentSource, Target, TargetId};

/// Mock target answering from a fixed table
pub struct MockTarget {
    id: TargetId,
    versions: HashMap<String, Vec<String>>,
    failing: bool,
}

impl MockTarget {
    pub fn new(id: TargetId) -> Self {
        Self {
            id,
            versions: HashMap::new(),
            failing: false,
        }
    }

    /// A target whose every lookup fails
    pub fn failing(id: TargetId) -> Self {
        Self {
            failing: true,
            ..Self::new(id)
        }
    }

    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            package.to_string(),
            versions.into_iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl Target for MockTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    async fn versions_for(&self, name: &str) -> Result<Vec<VersionString>, TargetError> {
        if self.failing {
            return Err(TargetError::unavailable(self.id, "mock failure"));
        }
        Ok(self
            .versions
            .get(name)
            .map(|versions| versions.iter().map(|v| VersionString::from(v.as_str())).collect())
            .unwrap_or_default())
    }
}

/// Mock component source answering from a fixed table
#[derive(Default)]
pub struct MockSource {
    components: HashMap<String, Component>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component.name.clone(), component);
        self
    }
}

#[async_trait]
impl ComponentSource for MockSource {
    async fn retrieve(&self, name: &str) -> Result<Component, TargetError> {
        self.components
            .get(name)
            .cloned()
            .ok_or_else(|| TargetError::NotFound(name.to_string()))
    }
}

/// Create a checker over the given targets with a short timeout
pub fn create_test_checker(targets: Vec<MockTarget>) -> VersionChecker {
    let targets: Vec<Arc<dyn Target>> = targets
        .into_iter()
        .map(|target| Arc::new(target) as Arc<dyn Target>)
        .collect();
    VersionChecker::new(targets, Duration::from_millis(500))
}
