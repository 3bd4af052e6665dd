//! Parsed bean manifests.

use serde::{Deserialize, Serialize};

use crate::error::{EspressoError, Result};

/// An executable action carried by a bean.
///
/// The body is opaque to the resolver and installer; only a
/// [`ScriptRunner`](crate::shell::ScriptRunner) interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Script source handed to the shell.
    pub body: String,

    /// Positional arguments passed to the script.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Script {
    /// Create a script that runs with no arguments.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            args: Vec::new(),
        }
    }

    /// Add a positional argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// One installable unit.
///
/// Manifests are immutable once built. Dependencies keep their declared
/// order with duplicates removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,
    dependencies: Vec<String>,
    script: Script,
    uninstall: Option<Script>,
}

impl Manifest {
    /// Build a manifest, validating the package name.
    ///
    /// A dependency on the manifest itself is kept; the resolver reports
    /// it as a cycle of length one.
    pub fn new(
        name: impl Into<String>,
        dependencies: impl IntoIterator<Item = String>,
        script: Script,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        let mut deduped: Vec<String> = Vec::new();
        for dep in dependencies {
            validate_name(&dep)?;
            if !deduped.contains(&dep) {
                deduped.push(dep);
            }
        }

        Ok(Self {
            name,
            dependencies: deduped,
            script,
            uninstall: None,
        })
    }

    /// Attach an uninstall action.
    pub fn with_uninstall(mut self, script: Script) -> Self {
        self.uninstall = Some(script);
        self
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct dependencies in declared order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Install action.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Uninstall action, if the bean provides one.
    pub fn uninstall(&self) -> Option<&Script> {
        self.uninstall.as_ref()
    }
}

/// Check whether a string is usable as a package name.
///
/// Names start with an ASCII letter or digit and continue with letters,
/// digits, `.`, `_`, `+` or `-`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
}

/// Return an error unless `name` is a valid package name.
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(EspressoError::InvalidPackageName {
            name: name.to_string(),
        })
    }
}
