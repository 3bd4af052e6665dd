//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands
//!
//! It also wires configuration into the concrete collaborators the
//! commands share: the file-backed registry, the bean fetcher and the
//! shell script runner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::bean::{source_from_location, BeanParser, BeanSource, SourceFetcher};
use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, ConfigOverrides, EspressoConfig};
use crate::error::{EspressoError, Result};
use crate::runner::Installer;
use crate::shell::{is_elevated, ShellScriptRunner};
use crate::state::{FileBackend, Registry};
use crate::ui::{OutputMode, UserInterface};

/// Environment variable telling scripts where the registry lives.
pub const STATE_DIR_ENV: &str = "ESPRESSO_STATE_DIR";

/// The installer the CLI runs.
pub type CliInstaller = Installer<SourceFetcher<Box<dyn BeanSource>, BeanParser>, ShellScriptRunner>;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl CommandDispatcher {
    /// Create a dispatcher from the global flags.
    pub fn new(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            config_path,
            overrides,
        }
    }

    /// Create a dispatcher from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(
            cli.config.clone(),
            ConfigOverrides {
                source: cli.source.clone(),
                state_dir: cli.state_dir.clone(),
            },
        )
    }

    /// Load the configuration with command-line overrides applied.
    pub fn config(&self) -> Result<EspressoConfig> {
        let mut config = load_config(self.config_path.as_deref())?;
        config.apply_overrides(&self.overrides);
        tracing::debug!(
            "source {}, state dir {}",
            config.source_location(),
            config.state_dir().display()
        );
        Ok(config)
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Install(args) => {
                let cmd = super::install::InstallCommand::new(self.config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Remove(args) => {
                let cmd = super::remove::RemoveCommand::new(self.config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::List(args) => {
                let cmd = super::list::ListCommand::new(self.config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Look(args) => {
                let cmd = super::look::LookCommand::new(self.config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}

/// Open the registry in the configured state directory.
pub fn open_registry(config: &EspressoConfig) -> Result<Registry> {
    Registry::load(FileBackend::in_dir(&config.state_dir()))
}

/// Open the configured bean source.
pub fn open_source(config: &EspressoConfig) -> Result<Box<dyn BeanSource>> {
    source_from_location(config.source_location(), config.fetch_timeout())
}

/// Build the installer from configuration.
///
/// Script output is captured in quiet mode and passed through otherwise.
pub fn build_installer(config: &EspressoConfig, mode: OutputMode) -> Result<CliInstaller> {
    let registry = open_registry(config)?;
    let fetcher = SourceFetcher::new(open_source(config)?, BeanParser).with_pins(config.pins.clone());
    let runner = ShellScriptRunner::new(config.shell.clone())
        .capture_output(!mode.shows_script_output())
        .with_env(script_env(&config.state_dir()));

    Ok(Installer::new(registry, fetcher, runner))
}

fn script_env(state_dir: &Path) -> HashMap<String, String> {
    HashMap::from([(STATE_DIR_ENV.to_string(), state_dir.display().to_string())])
}

/// Refuse to continue when root is required and the process lacks it.
pub fn ensure_privileges(config: &EspressoConfig, action: &str) -> Result<()> {
    if config.require_root && !is_elevated() {
        return Err(EspressoError::PermissionDenied {
            message: format!("{} requires root; re-run with sudo", action),
        });
    }
    Ok(())
}
