//! Look command implementation.
//!
//! The `espresso look [term]` command lists the beans a source offers.

use crate::cli::args::LookArgs;
use crate::config::EspressoConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{open_registry, open_source, Command, CommandResult};

/// The look command implementation.
pub struct LookCommand {
    config: EspressoConfig,
    args: LookArgs,
}

impl LookCommand {
    /// Create a new look command.
    pub fn new(config: EspressoConfig, args: LookArgs) -> Self {
        Self { config, args }
    }

    fn matches(&self, name: &str) -> bool {
        match &self.args.term {
            Some(term) => name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }
}

impl Command for LookCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let source = open_source(&self.config)?;
        let registry = open_registry(&self.config)?;

        let mut spinner = ui.start_spinner(&format!("Looking in {}", source.describe()));
        let available = match source.available() {
            Ok(names) => {
                spinner.finish_clear();
                names
            }
            Err(e) => {
                spinner.finish_error("Could not list beans");
                return Err(e);
            }
        };

        let found: Vec<_> = available.iter().filter(|n| self.matches(n)).collect();
        if found.is_empty() {
            match &self.args.term {
                Some(term) => ui.message(&format!("No beans matching '{}'", term)),
                None => ui.message("No beans available"),
            }
            return Ok(CommandResult::success());
        }

        for name in found {
            if registry.contains(name) {
                ui.data(&format!("{} (installed)", name));
            } else {
                ui.data(name);
            }
        }

        Ok(CommandResult::success())
    }
}
