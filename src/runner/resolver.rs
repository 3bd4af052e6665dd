//! Dependency resolution.
//!
//! The resolver walks the dependency graph depth-first from the requested
//! package and emits packages in post-order, so every package comes after
//! the dependencies it declares. Each name is in one of three states:
//! unvisited, in progress (on the current DFS path) or done. Reaching a
//! done name is a no-op, which is how diamond dependencies get fetched
//! only once. Reaching an in-progress name means the path has looped back
//! on itself and planning fails with the cycle.
//!
//! Installed packages are not fetched, but the dependency edges recorded
//! in the registry are still walked, so a loop that passes through an
//! installed package is reported too. Recorded edges only lead to other
//! installed packages or to names already on the walk.

use std::collections::{HashMap, HashSet};

use crate::bean::{validate_name, Manifest};
use crate::error::{EspressoError, Result};
use crate::state::Registry;

use super::plan::InstallPlan;

/// Longest dependency chain the resolver follows before giving up.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

#[derive(Default)]
struct Walk {
    marks: HashMap<String, Mark>,
    path: Vec<String>,
}

/// Computes installation plans against a registry.
#[derive(Debug)]
pub struct Resolver<'a> {
    registry: &'a Registry,
    force: HashSet<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that treats registry members as already done.
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            force: HashSet::new(),
        }
    }

    /// Plan these packages even if they are already installed.
    pub fn with_force(mut self, force: impl IntoIterator<Item = String>) -> Self {
        self.force.extend(force);
        self
    }

    /// Build the installation plan for `root`.
    ///
    /// `fetch` is called at most once per name, and never for installed
    /// names that are not forced. Any fetch error aborts planning and no
    /// partial plan is returned.
    pub fn plan<F>(&self, root: &str, mut fetch: F) -> Result<InstallPlan>
    where
        F: FnMut(&str) -> Result<Manifest>,
    {
        validate_name(root)?;

        let mut plan = InstallPlan::new(root);
        let mut walk = Walk::default();
        self.visit(root, &mut fetch, &mut walk, &mut plan)?;

        tracing::debug!("plan for {}: {:?}", root, plan.names());
        Ok(plan)
    }

    fn visit<F>(
        &self,
        name: &str,
        fetch: &mut F,
        walk: &mut Walk,
        plan: &mut InstallPlan,
    ) -> Result<()>
    where
        F: FnMut(&str) -> Result<Manifest>,
    {
        match walk.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = walk.path.iter().position(|n| n == name).unwrap_or(0);
                let mut cycle = walk.path[start..].to_vec();
                cycle.push(name.to_string());
                return Err(EspressoError::CircularDependency { cycle });
            }
            None => {}
        }

        if walk.path.len() >= MAX_DEPTH {
            return Err(EspressoError::DependencyTooDeep {
                package: name.to_string(),
                limit: MAX_DEPTH,
            });
        }

        let (manifest, dependencies) = match self.registry.get(name) {
            Some(record) if !self.force.contains(name) => {
                tracing::debug!("{} already installed", name);
                plan.mark_satisfied(name);
                (None, record.dependencies.clone())
            }
            _ => {
                let manifest = fetch(name)?;
                let dependencies = manifest.dependencies().to_vec();
                (Some(manifest), dependencies)
            }
        };

        walk.marks.insert(name.to_string(), Mark::InProgress);
        walk.path.push(name.to_string());

        for dep in &dependencies {
            let recorded_only = manifest.is_none()
                && !self.registry.contains(dep)
                && !walk.marks.contains_key(dep);
            if recorded_only {
                continue;
            }
            self.visit(dep, fetch, walk, plan)?;
        }

        walk.path.pop();
        walk.marks.insert(name.to_string(), Mark::Done);
        if let Some(manifest) = manifest {
            plan.push(manifest);
        }
        Ok(())
    }
}
