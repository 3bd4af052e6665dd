//! Registry persistence backends.
//!
//! The registry itself never touches the filesystem; it hands its records
//! to a [`RegistryBackend`] after every mutation. [`FileBackend`] keeps
//! them in a YAML file, [`MemoryBackend`] keeps them in memory.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{EspressoError, Result};

use super::registry::InstalledPackage;

/// Records keyed by package name.
pub type Records = BTreeMap<String, InstalledPackage>;

/// Durable storage for the installed-package registry.
pub trait RegistryBackend: Send {
    /// Load all records. A backend with nothing stored yields an empty map.
    fn load(&self) -> Result<Records>;

    /// Replace the stored records. Must be durable before returning.
    fn save(&self, records: &Records) -> Result<()>;
}

/// On-disk layout of the registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryFile {
    /// Schema version for migration.
    version: u32,

    /// Installed packages.
    #[serde(default)]
    packages: Records,
}

/// Registry stored as `installed.yml` inside a state directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// File name used inside the state directory.
    pub const FILE_NAME: &'static str = "installed.yml";

    /// Create a backend for the registry file in `state_dir`.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(Self::FILE_NAME))
    }

    /// Create a backend for an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, message: impl ToString) -> EspressoError {
        EspressoError::RegistryIo {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

impl RegistryBackend for FileBackend {
    fn load(&self) -> Result<Records> {
        if !self.path.exists() {
            return Ok(Records::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Records::new());
        }

        let file: RegistryFile = serde_yaml::from_str(&content).map_err(|e| self.io_error(e))?;
        if file.version > Self::CURRENT_VERSION {
            return Err(self.io_error(format!(
                "unsupported registry version {} (expected {})",
                file.version,
                Self::CURRENT_VERSION
            )));
        }

        Ok(file.packages)
    }

    /// Save the registry using an atomic write.
    ///
    /// Content goes to a temp file that is synced and then renamed over
    /// the real file, so a crash never leaves a partially written registry.
    fn save(&self, records: &Records) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let file = RegistryFile {
            version: Self::CURRENT_VERSION,
            packages: records.clone(),
        };
        let content = serde_yaml::to_string(&file).map_err(|e| self.io_error(e))?;

        let temp_path = self.path.with_extension("yml.tmp");
        let mut temp = File::create(&temp_path).map_err(|e| self.io_error(e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.sync_all())
            .map_err(|e| self.io_error(e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("registry flushed to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Records,
    saves: usize,
    fail_saves: bool,
}

/// In-memory backend.
///
/// Clones share the same storage, so a test can keep one handle and give
/// another to a registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with records.
    pub fn with_records(records: Records) -> Self {
        let backend = Self::new();
        backend.lock().records = records;
        backend
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Records {
        self.lock().records.clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    /// Make subsequent saves fail with a registry I/O error.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave the map half-written.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RegistryBackend for MemoryBackend {
    fn load(&self) -> Result<Records> {
        Ok(self.lock().records.clone())
    }

    fn save(&self, records: &Records) -> Result<()> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(EspressoError::RegistryIo {
                path: PathBuf::from("<memory>"),
                message: "save rejected".to_string(),
            });
        }
        state.records = records.clone();
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record() -> InstalledPackage {
        InstalledPackage {
            installed_at: Utc::now(),
            dependencies: vec!["zlib".to_string()],
            uninstall: None,
        }
    }

    #[test]
    fn file_backend_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::in_dir(temp.path());
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn file_backend_persists_records() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::in_dir(&temp.path().join("nested"));

        let mut records = Records::new();
        records.insert("curl".to_string(), record());
        backend.save(&records).unwrap();

        let reloaded = FileBackend::in_dir(&temp.path().join("nested")).load().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded["curl"].dependencies, vec!["zlib"]);
        assert!(!backend.path().with_extension("yml.tmp").exists());
    }

    #[test]
    fn file_backend_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::in_dir(temp.path());
        fs::write(backend.path(), "packages: [not, a, map").unwrap();

        let err = backend.load().unwrap_err();
        assert!(matches!(err, EspressoError::RegistryIo { .. }));
    }

    #[test]
    fn file_backend_rejects_future_version() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::in_dir(temp.path());
        fs::write(backend.path(), "version: 99\npackages: {}\n").unwrap();

        let err = backend.load().unwrap_err();
        assert!(err.to_string().contains("unsupported registry version"));
    }

    #[test]
    fn memory_backend_clones_share_storage() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        let mut records = Records::new();
        records.insert("git".to_string(), record());
        backend.save(&records).unwrap();

        assert!(handle.records().contains_key("git"));
        assert_eq!(handle.saves(), 1);
    }

    #[test]
    fn memory_backend_can_fail_saves() {
        let backend = MemoryBackend::new();
        backend.fail_saves(true);
        assert!(backend.save(&Records::new()).is_err());
        assert_eq!(backend.saves(), 0);
    }
}
