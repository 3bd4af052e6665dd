//! Install command implementation.
//!
//! The `espresso install <name>` command resolves the package's
//! dependencies and runs every missing install script in order.

use std::collections::HashSet;

use crate::cli::args::InstallArgs;
use crate::config::EspressoConfig;
use crate::error::{EspressoError, Result};
use crate::runner::{InstallOptions, InstallProgress};
use crate::ui::{format_duration, SpinnerHandle, UserInterface};

use super::dispatcher::{build_installer, ensure_privileges, Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    config: EspressoConfig,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(config: EspressoConfig, args: InstallArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InstallArgs {
        &self.args
    }

    fn options(&self) -> InstallOptions {
        let mut force = HashSet::new();
        if self.args.force {
            force.insert(self.args.name.clone());
        }
        InstallOptions { force }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ensure_privileges(&self.config, "install")?;

        let name = &self.args.name;
        let installer = build_installer(&self.config, ui.output_mode())?;
        let details = ui.output_mode().shows_details();

        let mut spinner: Option<Box<dyn SpinnerHandle>> =
            Some(ui.start_spinner(&format!("Resolving {}", name)));

        let result = installer.install_with_progress(name, &self.options(), |event| match event {
            InstallProgress::Planned { plan } => {
                if let Some(mut s) = spinner.take() {
                    s.finish_clear();
                }
                if details && !plan.is_empty() {
                    ui.message(&format!("Plan: {}", plan.names().join(" -> ")));
                }
            }
            InstallProgress::Skipped { name } => {
                if details {
                    ui.message(&format!("{} is already installed", name));
                }
            }
            InstallProgress::Starting { name, index, total } => {
                ui.show_progress(index, total, name);
            }
            InstallProgress::Installed { name, outcome } => {
                if details {
                    ui.message(&format!(
                        "{} finished in {}",
                        name,
                        format_duration(outcome.duration)
                    ));
                }
            }
        });

        match result {
            Ok(report) if report.is_noop() => {
                ui.success(&format!("{} is already installed", name));
                Ok(CommandResult::success())
            }
            Ok(report) => {
                ui.success(&format!(
                    "Installed {} ({} package{} in {})",
                    name,
                    report.installed.len(),
                    if report.installed.len() == 1 { "" } else { "s" },
                    format_duration(report.duration)
                ));
                Ok(CommandResult::success())
            }
            Err(e) => {
                if let Some(mut s) = spinner.take() {
                    s.finish_error(&format!("Could not resolve {}", name));
                }
                if matches!(e, EspressoError::InstallFailed { .. }) {
                    ui.warning(&format!(
                        "Packages installed before the failure were kept; run `espresso install {}` again to resume",
                        name
                    ));
                }
                Err(e)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::commands::dispatcher::open_registry;
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup(beans: &[(&str, &str)]) -> (TempDir, EspressoConfig) {
        let temp = TempDir::new().unwrap();
        let bean_dir = temp.path().join("beans");
        fs::create_dir_all(&bean_dir).unwrap();
        for (name, content) in beans {
            fs::write(bean_dir.join(format!("{}.bean", name)), content).unwrap();
        }
        let config = EspressoConfig {
            source: Some(bean_dir.display().to_string()),
            state_dir: Some(temp.path().join("state")),
            ..Default::default()
        };
        (temp, config)
    }

    fn marker_script(dir: &Path, name: &str) -> String {
        format!("touch '{}'\n", dir.join(name).display())
    }

    fn install(config: &EspressoConfig, name: &str, force: bool) -> (Result<CommandResult>, MockUI) {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        let cmd = InstallCommand::new(
            config.clone(),
            InstallArgs {
                name: name.to_string(),
                force,
            },
        );
        let result = cmd.execute(&mut ui);
        (result, ui)
    }

    #[test]
    fn installs_dependencies_first() {
        let marks = TempDir::new().unwrap();
        let app = format!(
            "depends=(lib)\ntest -f '{}' || exit 3\n{}",
            marks.path().join("lib").display(),
            marker_script(marks.path(), "app")
        );
        let lib = marker_script(marks.path(), "lib");
        let (_temp, config) = setup(&[("app", app.as_str()), ("lib", lib.as_str())]);

        let (result, ui) = install(&config, "app", false);

        assert!(result.unwrap().success);
        assert!(marks.path().join("app").exists());
        assert_eq!(
            ui.progress(),
            [(1, 2, "lib".to_string()), (2, 2, "app".to_string())]
        );
        let registry = open_registry(&config).unwrap();
        assert!(registry.contains("app"));
        assert!(registry.contains("lib"));
    }

    #[test]
    fn reports_already_installed() {
        let (_temp, config) = setup(&[("app", "true\n")]);
        install(&config, "app", false).0.unwrap();

        let (result, ui) = install(&config, "app", false);

        assert!(result.unwrap().success);
        assert!(ui.progress().is_empty());
        assert_eq!(ui.successes(), ["app is already installed"]);
    }

    #[test]
    fn force_reruns_the_script() {
        let (_temp, config) = setup(&[("app", "true\n")]);
        install(&config, "app", false).0.unwrap();

        let (result, ui) = install(&config, "app", true);

        assert!(result.unwrap().success);
        assert_eq!(ui.progress(), [(1, 1, "app".to_string())]);
    }

    #[test]
    fn failed_script_suggests_resuming() {
        let (_temp, config) = setup(&[("app", "depends=(lib)\nexit 4\n"), ("lib", "true\n")]);

        let (result, ui) = install(&config, "app", false);

        assert!(matches!(
            result,
            Err(EspressoError::InstallFailed { ref package, .. }) if package == "app"
        ));
        assert_eq!(ui.warnings().len(), 1);
        assert!(open_registry(&config).unwrap().contains("lib"));
    }

    #[test]
    fn unknown_package_is_a_fetch_error() {
        let (_temp, config) = setup(&[]);

        let (result, _ui) = install(&config, "ghost", false);

        assert!(matches!(result, Err(EspressoError::ManifestFetch { .. })));
    }

    #[test]
    fn cycle_installs_nothing() {
        let (_temp, config) = setup(&[("a", "depends=(b)\n"), ("b", "depends=(a)\n")]);

        let (result, _ui) = install(&config, "a", false);

        assert!(matches!(
            result,
            Err(EspressoError::CircularDependency { .. })
        ));
        assert!(open_registry(&config).unwrap().is_empty());
    }
}
