//! Dependency graph traversal
//!
//! Walks a component's requirements depth-first in declaration order,
//! resolving each component name through a [`ComponentSource`] at most once.

use std::collections::HashSet;

use futures::future::{BoxFuture, FutureExt, join_all};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::component::Component;
use crate::version::checker::{TargetResult, VersionChecker};
use crate::version::requirement::Requirement;
use crate::version::target::ComponentSource;

/// How far a dependency walk goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Expand the dependencies of resolved dependencies
    pub recursive: bool,
    /// Include development dependencies at every level
    pub dev_deps: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            dev_deps: false,
        }
    }
}

/// Components seen during a walk, keyed by name in first-seen order
///
/// `None` marks a name the source could not resolve.
pub type Visited = IndexMap<String, Option<Component>>;

struct Walk<'a, F> {
    source: &'a dyn ComponentSource,
    options: TreeOptions,
    visit: F,
    visited: Visited,
    reported: HashSet<Requirement>,
}

impl<'a, F> Walk<'a, F>
where
    F: FnMut(&Component, &Requirement, Option<&Component>) + Send,
{
    fn requirements_of(&self, component: &Component) -> Vec<Requirement> {
        let mut reqs = component.deps.clone();
        if self.options.dev_deps {
            reqs.extend(component.dev_deps.iter().cloned());
        }
        reqs
    }

    async fn resolve(&mut self, name: &str) -> (Option<Component>, bool) {
        if let Some(resolved) = self.visited.get(name) {
            return (resolved.clone(), false);
        }

        let resolved = match self.source.retrieve(name).await {
            Ok(component) => Some(component),
            Err(e) => {
                warn!("Failed to resolve {}: {}", name, e);
                None
            }
        };
        self.visited.insert(name.to_string(), resolved.clone());
        (resolved, true)
    }

    fn expand<'w>(&'w mut self, parent: Component) -> BoxFuture<'w, ()>
    where
        'a: 'w,
    {
        async move {
            for req in self.requirements_of(&parent) {
                let name = req.component_name().to_string();
                let (resolved, first_seen) = self.resolve(&name).await;

                if self.reported.insert(req.clone()) {
                    (self.visit)(&parent, &req, resolved.as_ref());
                }

                if first_seen && self.options.recursive {
                    if let Some(child) = resolved {
                        self.expand(child).await;
                    }
                }
            }
        }
        .boxed()
    }
}

/// Walk the dependencies of `root`, calling `visit(parent, requirement,
/// resolved)` once per distinct requirement
///
/// Cycles end at the visited map: a name already seen is never expanded
/// again. Returns every component seen, root first.
pub async fn dependency_tree<F>(
    source: &dyn ComponentSource,
    root: &Component,
    options: TreeOptions,
    visit: F,
) -> Visited
where
    F: FnMut(&Component, &Requirement, Option<&Component>) + Send,
{
    let mut walk = Walk {
        source,
        options,
        visit,
        visited: Visited::new(),
        reported: HashSet::new(),
    };
    walk.visited.insert(root.name.clone(), Some(root.clone()));
    walk.expand(root.clone()).await;

    debug!(
        "Walked {} components from {}",
        walk.visited.len(),
        root.name
    );
    walk.visited
}

/// Versions of `root` and of every dependency the walk reaches
pub async fn dependency_versions(
    checker: &VersionChecker,
    source: &dyn ComponentSource,
    root: &Component,
    options: TreeOptions,
) -> IndexMap<String, TargetResult> {
    let visited = dependency_tree(source, root, options, |_, _, _| {}).await;
    let names: Vec<&String> = visited.keys().collect();

    let results = join_all(names.iter().map(|name| checker.versions_for(name, None))).await;

    names
        .into_iter()
        .cloned()
        .zip(results)
        .collect()
}
