//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// espresso - brew beans and everything they depend on.
#[derive(Debug, Parser)]
#[command(name = "espresso")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides $ESPRESSO_CONFIG and the default location)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bean source: URL or directory (overrides the config file)
    #[arg(short, long, global = true)]
    pub source: Option<String>,

    /// Directory holding the installed-package registry
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors; capture script output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a package and its dependencies
    Install(InstallArgs),

    /// Remove an installed package
    Remove(RemoveArgs),

    /// List installed packages
    List(ListArgs),

    /// Look up beans available from the source
    Look(LookArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Package to install
    pub name: String,

    /// Reinstall the package even if it is already installed
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `remove` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RemoveArgs {
    /// Package to remove
    pub name: String,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `look` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LookArgs {
    /// Only show beans whose name contains this text
    pub term: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
