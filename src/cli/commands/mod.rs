//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration once per invocation and routes the subcommand to its
//! implementation.

pub mod completions;
pub mod dispatcher;
pub mod install;
pub mod list;
pub mod look;
pub mod remove;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
