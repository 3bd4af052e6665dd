//! Script execution.

pub mod command;
pub mod platform;
pub mod script;

pub use command::{execute, CommandOptions, CommandResult};
pub use platform::is_elevated;
pub use script::{ScriptOutcome, ScriptRunner, ShellScriptRunner, DEFAULT_SHELL};
