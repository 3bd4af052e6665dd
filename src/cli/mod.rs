//! Command-line interface for espresso.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, InstallArgs, ListArgs, LookArgs, RemoveArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
