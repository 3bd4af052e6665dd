//! Remove command implementation.
//!
//! The `espresso remove <name>` command runs the package's recorded
//! uninstall action and drops it from the registry. Dependencies and
//! dependents are not touched.

use crate::cli::args::RemoveArgs;
use crate::config::EspressoConfig;
use crate::error::Result;
use crate::state::Registry;
use crate::ui::UserInterface;

use super::dispatcher::{build_installer, ensure_privileges, Command, CommandResult};

/// The remove command implementation.
pub struct RemoveCommand {
    config: EspressoConfig,
    args: RemoveArgs,
}

impl RemoveCommand {
    /// Create a new remove command.
    pub fn new(config: EspressoConfig, args: RemoveArgs) -> Self {
        Self { config, args }
    }
}

/// Installed packages that declared `name` as a dependency.
fn dependents(registry: &Registry, name: &str) -> Vec<String> {
    registry
        .iter()
        .filter(|(_, pkg)| pkg.dependencies.iter().any(|d| d == name))
        .map(|(dependent, _)| dependent.to_string())
        .collect()
}

impl Command for RemoveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ensure_privileges(&self.config, "remove")?;

        let name = &self.args.name;
        let installer = build_installer(&self.config, ui.output_mode())?;
        let still_needed = installer.with_registry(|registry| dependents(registry, name));

        let removed = installer.remove(name)?;
        if removed.uninstall.is_none() {
            ui.warning(&format!(
                "{} has no uninstall action; only the record was removed",
                name
            ));
        }
        if !still_needed.is_empty() {
            ui.warning(&format!(
                "{} is still required by {}",
                name,
                still_needed.join(", ")
            ));
        }

        ui.success(&format!("Removed {}", name));
        Ok(CommandResult::success())
    }
}
