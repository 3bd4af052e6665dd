//! List command implementation.
//!
//! The `espresso list` command prints installed packages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::config::EspressoConfig;
use crate::error::Result;
use crate::state::Registry;
use crate::ui::theme::EspressoTheme;
use crate::ui::{format_relative_time, UserInterface};

use super::dispatcher::{open_registry, Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    config: EspressoConfig,
    args: ListArgs,
}

/// One installed package in `--json` output.
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    installed_at: DateTime<Utc>,
    dependencies: &'a [String],
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(config: EspressoConfig, args: ListArgs) -> Self {
        Self { config, args }
    }

    fn render_json(registry: &Registry) -> Result<String> {
        let entries: Vec<ListEntry<'_>> = registry
            .iter()
            .map(|(name, pkg)| ListEntry {
                name,
                installed_at: pkg.installed_at,
                dependencies: &pkg.dependencies,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
        Ok(json)
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = open_registry(&self.config)?;

        if self.args.json {
            ui.data(&Self::render_json(&registry)?);
            return Ok(CommandResult::success());
        }

        if registry.is_empty() {
            ui.message("No packages installed");
            return Ok(CommandResult::success());
        }

        let theme = EspressoTheme::new();
        let width = registry.list().iter().map(String::len).max().unwrap_or(0);
        for (name, pkg) in registry.iter() {
            ui.data(&format!(
                "{:<width$}  {}",
                name,
                theme.dim.apply_to(format_relative_time(pkg.installed_at)),
                width = width
            ));
        }

        Ok(CommandResult::success())
    }
}
