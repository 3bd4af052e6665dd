//! The installed-package registry.
//!
//! A name is in the registry iff its install script has run to completion
//! at least once. Every mutation is flushed to the backend before the
//! mutating call returns.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bean::{Manifest, Script};
use crate::error::{EspressoError, Result};

use super::store::{Records, RegistryBackend};

/// What the registry remembers about an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// When the install script last completed.
    pub installed_at: DateTime<Utc>,

    /// Dependencies the bean declared at install time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Uninstall action captured at install time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<Script>,
}

impl InstalledPackage {
    /// Record a manifest whose install script just completed.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            installed_at: Utc::now(),
            dependencies: manifest.dependencies().to_vec(),
            uninstall: manifest.uninstall().cloned(),
        }
    }
}

/// Tracks which packages are installed.
pub struct Registry {
    backend: Box<dyn RegistryBackend>,
    packages: Records,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Load the registry from a backend.
    pub fn load(backend: impl RegistryBackend + 'static) -> Result<Self> {
        let packages = backend.load()?;
        tracing::debug!("registry loaded with {} package(s)", packages.len());
        Ok(Self {
            backend: Box::new(backend),
            packages,
        })
    }

    /// Check whether a package is installed.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Get the record for an installed package.
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(name)
    }

    /// Names of all installed packages.
    pub fn list(&self) -> BTreeSet<String> {
        self.packages.keys().cloned().collect()
    }

    /// Iterate over installed packages in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstalledPackage)> {
        self.packages.iter().map(|(name, pkg)| (name.as_str(), pkg))
    }

    /// Number of installed packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Record a package as installed and flush.
    ///
    /// If the flush fails the in-memory registry still holds the package,
    /// since its script did run; the error is returned so the caller can
    /// retry with [`Registry::flush`].
    pub fn add(&mut self, name: &str, package: InstalledPackage) -> Result<()> {
        self.packages.insert(name.to_string(), package);
        self.flush()
    }

    /// Remove a package and flush.
    ///
    /// If the flush fails the record is put back, so memory keeps matching
    /// the backend, which still lists the package.
    pub fn remove(&mut self, name: &str) -> Result<InstalledPackage> {
        let removed = self
            .packages
            .remove(name)
            .ok_or_else(|| EspressoError::NotInstalled {
                package: name.to_string(),
            })?;
        if let Err(e) = self.flush() {
            self.packages.insert(name.to_string(), removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Write the current records to the backend.
    pub fn flush(&self) -> Result<()> {
        self.backend.save(&self.packages)
    }
}
