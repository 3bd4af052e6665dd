//! Installation orchestration.
//!
//! Installing is two-phase: the [`Resolver`] builds a complete plan
//! first, then the plan is executed entry by entry. Nothing runs if
//! planning fails. Once execution starts, the first failing script stops
//! the run; packages installed before it stay recorded, so re-running
//! the same install resumes from the failed package.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::bean::ManifestFetcher;
use crate::error::{EspressoError, Result};
use crate::shell::{ScriptOutcome, ScriptRunner};
use crate::state::{InstalledPackage, Registry};

use super::plan::InstallPlan;
use super::resolver::Resolver;

/// Progress events emitted while installing.
#[derive(Debug)]
pub enum InstallProgress<'a> {
    /// Planning finished.
    Planned { plan: &'a InstallPlan },
    /// A package's install script is about to run.
    Starting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A package's install script completed and was recorded.
    Installed {
        name: &'a str,
        outcome: &'a ScriptOutcome,
    },
    /// A package reached while planning was already installed.
    Skipped { name: &'a str },
}

/// Options for an install.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Reinstall these packages even if the registry has them.
    pub force: HashSet<String>,
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// The requested package.
    pub root: String,
    /// Packages whose scripts ran, in order.
    pub installed: Vec<String>,
    /// Packages that were already installed.
    pub skipped: Vec<String>,
    /// Total duration including planning.
    pub duration: Duration,
}

impl InstallReport {
    /// Check if the install did nothing.
    pub fn is_noop(&self) -> bool {
        self.installed.is_empty()
    }
}

/// Requests cancellation of a running install.
///
/// Cancellation takes effect before the next plan entry starts; a script
/// that is already running always completes. A request only applies to
/// the install in progress: each install clears the flag when it starts,
/// and a request the install never observed is dropped with it.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Ask the installer to stop before the next package.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Consume a pending request, clearing it.
    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Drives installs and removals against a registry.
///
/// The registry sits behind a mutex held for the whole of each `install`
/// or `remove` call, so concurrent callers are serialized and never run
/// the same script twice.
pub struct Installer<F, R> {
    registry: Mutex<Registry>,
    fetcher: F,
    runner: R,
    cancel: CancelHandle,
}

impl<F: ManifestFetcher, R: ScriptRunner> Installer<F, R> {
    /// Create an installer.
    pub fn new(registry: Registry, fetcher: F, runner: R) -> Self {
        Self {
            registry: Mutex::new(registry),
            fetcher,
            runner,
            cancel: CancelHandle::default(),
        }
    }

    /// Handle for cancelling installs from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run `f` with read access to the registry.
    pub fn with_registry<T>(&self, f: impl FnOnce(&Registry) -> T) -> T {
        f(&self.lock())
    }

    /// Take the registry back out of the installer.
    pub fn into_registry(self) -> Registry {
        self.registry
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Plan without installing anything.
    pub fn plan(&self, root: &str, options: &InstallOptions) -> Result<InstallPlan> {
        let registry = self.lock();
        Resolver::new(&registry)
            .with_force(options.force.iter().cloned())
            .plan(root, |name| self.fetcher.fetch(name))
    }

    /// Install `root` and everything it depends on.
    pub fn install(&self, root: &str) -> Result<InstallReport> {
        self.install_with_progress(root, &InstallOptions::default(), |_| {})
    }

    /// Install with options and a progress callback.
    pub fn install_with_progress(
        &self,
        root: &str,
        options: &InstallOptions,
        mut on_progress: impl FnMut(InstallProgress<'_>),
    ) -> Result<InstallReport> {
        let start = Instant::now();
        let mut registry = self.lock();
        // Requests aimed at an earlier install must not leak into this one.
        self.cancel.reset();

        let plan = Resolver::new(&registry)
            .with_force(options.force.iter().cloned())
            .plan(root, |name| self.fetcher.fetch(name))?;
        on_progress(InstallProgress::Planned { plan: &plan });
        for name in plan.satisfied() {
            on_progress(InstallProgress::Skipped { name });
        }

        let total = plan.len();
        let mut installed = Vec::new();

        for (index, manifest) in plan.iter().enumerate() {
            let name = manifest.name();

            if self.cancel.take() {
                tracing::warn!("install of {} cancelled before {}", root, name);
                return Err(EspressoError::Cancelled {
                    completed: installed.len(),
                });
            }

            on_progress(InstallProgress::Starting {
                name,
                index: index + 1,
                total,
            });

            let outcome = self
                .runner
                .run(manifest.script())
                .map_err(|e| script_error(name, None, e.to_string()))
                .and_then(|outcome| {
                    if outcome.success {
                        Ok(outcome)
                    } else {
                        Err(failed_outcome(name, &outcome))
                    }
                })
                .map_err(|source| {
                    tracing::error!("installing {} failed: {}", name, source);
                    EspressoError::InstallFailed {
                        package: name.to_string(),
                        source: Box::new(source),
                    }
                })?;

            if let Err(e) = registry.add(name, InstalledPackage::from_manifest(manifest)) {
                tracing::error!(
                    "{} installed but the registry could not be saved: {}",
                    name,
                    e
                );
                return Err(flush_error(name, e));
            }

            tracing::info!("installed {} in {:?}", name, outcome.duration);
            on_progress(InstallProgress::Installed {
                name,
                outcome: &outcome,
            });
            installed.push(name.to_string());
        }

        Ok(InstallReport {
            root: root.to_string(),
            installed,
            skipped: plan.satisfied().to_vec(),
            duration: start.elapsed(),
        })
    }

    /// Remove an installed package.
    ///
    /// Runs the uninstall action recorded at install time, if any, and
    /// then drops the package from the registry. Dependencies and
    /// dependents are left alone.
    pub fn remove(&self, name: &str) -> Result<InstalledPackage> {
        let mut registry = self.lock();

        let record = registry
            .get(name)
            .cloned()
            .ok_or_else(|| EspressoError::NotInstalled {
                package: name.to_string(),
            })?;

        if let Some(uninstall) = &record.uninstall {
            let outcome = self
                .runner
                .run(uninstall)
                .map_err(|e| script_error(name, None, e.to_string()))?;
            if !outcome.success {
                return Err(failed_outcome(name, &outcome));
            }
        } else {
            tracing::debug!("{} has no uninstall action", name);
        }

        let removed = registry.remove(name).map_err(|e| match e {
            EspressoError::RegistryIo { .. } => {
                tracing::error!(
                    "{} uninstalled but the registry could not be saved: {}",
                    name,
                    e
                );
                flush_error(name, e)
            }
            other => other,
        })?;
        tracing::info!("removed {}", name);
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Registry mutations are insert-then-flush; a panicking script
        // runner cannot leave one half done.
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn script_error(package: &str, code: Option<i32>, message: String) -> EspressoError {
    EspressoError::ScriptExecution {
        package: package.to_string(),
        code,
        message,
    }
}

fn flush_error(package: &str, source: EspressoError) -> EspressoError {
    EspressoError::RegistryFlushFailed {
        package: package.to_string(),
        source: Box::new(source),
    }
}

fn failed_outcome(package: &str, outcome: &ScriptOutcome) -> EspressoError {
    let message = outcome
        .last_error_line()
        .unwrap_or("script exited unsuccessfully")
        .to_string();
    script_error(package, outcome.exit_code, message)
}
