//! Running bean scripts.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::bean::Script;
use crate::error::Result;

use super::command::{execute, CommandOptions, CommandResult};

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Outcome of running a script: exit status, captured output and duration.
pub type ScriptOutcome = CommandResult;

/// Executes install and uninstall actions.
pub trait ScriptRunner {
    /// Run a script to completion.
    ///
    /// Returns an error only if the script could not be started. A script
    /// that exits non-zero is reported through [`ScriptOutcome::success`].
    fn run(&self, script: &Script) -> Result<ScriptOutcome>;
}

/// Runs scripts with a system shell.
#[derive(Debug, Clone)]
pub struct ShellScriptRunner {
    shell: String,
    options: CommandOptions,
}

impl Default for ShellScriptRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellScriptRunner {
    /// Create a runner that uses `shell` and inherits the terminal.
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            options: CommandOptions::default(),
        }
    }

    /// Capture script output instead of passing it through.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.options.capture_stdout = capture;
        self.options.capture_stderr = capture;
        self
    }

    /// Run scripts from this directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(cwd.into());
        self
    }

    /// Export extra environment variables to scripts.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.options.env.extend(env);
        self
    }

    /// The shell executable.
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl ScriptRunner for ShellScriptRunner {
    fn run(&self, script: &Script) -> Result<ScriptOutcome> {
        tracing::debug!("running script with {} (args {:?})", self.shell, script.args);
        let outcome = execute(&self.shell, &script.body, &script.args, &self.options)?;

        if !outcome.stdout.is_empty() {
            tracing::debug!("script stdout:\n{}", outcome.stdout);
        }
        if !outcome.stderr.is_empty() {
            tracing::debug!("script stderr:\n{}", outcome.stderr);
        }

        Ok(outcome)
    }
}
