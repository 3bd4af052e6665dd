//! Installation plans.

use std::collections::HashMap;

use crate::bean::Manifest;

/// Ordered list of packages to install, dependencies first.
///
/// Each name appears once and carries the manifest fetched while
/// planning, so executing the plan needs no further fetches. Installed
/// packages reached during planning are kept separately as satisfied.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    root: String,
    order: Vec<String>,
    manifests: HashMap<String, Manifest>,
    satisfied: Vec<String>,
}

impl InstallPlan {
    pub(crate) fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            order: Vec::new(),
            manifests: HashMap::new(),
            satisfied: Vec::new(),
        }
    }

    /// Record an installed package the plan depends on.
    pub(crate) fn mark_satisfied(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.satisfied.contains(&name) {
            self.satisfied.push(name);
        }
    }

    /// Append a manifest after all of its dependencies.
    pub(crate) fn push(&mut self, manifest: Manifest) {
        let name = manifest.name().to_string();
        if self.manifests.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.manifests.insert(name, manifest);
    }

    /// The package the plan was built for.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Package names in installation order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Installed packages that were reached but need no work, in the
    /// order they were reached.
    pub fn satisfied(&self) -> &[String] {
        &self.satisfied
    }

    /// Manifests in installation order.
    pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
        self.order.iter().filter_map(|name| self.manifests.get(name))
    }

    /// Manifest for a planned package.
    pub fn manifest(&self, name: &str) -> Option<&Manifest> {
        self.manifests.get(name)
    }

    /// Check if a package is part of the plan.
    pub fn contains(&self, name: &str) -> bool {
        self.manifests.contains_key(name)
    }

    /// Position of a package in the plan.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    /// Number of planned packages.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there is nothing to install.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
