//! Error types for espresso operations.
//!
//! This module defines [`EspressoError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every error raised by a collaborator (fetcher, parser, script runner,
//!   registry backend) is wrapped with the package name it pertains to
//! - Nothing is retried; the first failure is returned to the caller
//! - Use `anyhow::Error` (via `EspressoError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a manifest could not be obtained from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The source has no bean with that name.
    NotFound,
    /// The source could not be reached or answered with an error.
    Transport,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Transport => write!(f, "transport error"),
        }
    }
}

/// Core error type for espresso operations.
#[derive(Debug, Error)]
pub enum EspressoError {
    /// The manifest for a package could not be fetched.
    #[error("Failed to fetch bean '{package}' ({kind}): {message}")]
    ManifestFetch {
        package: String,
        kind: FetchErrorKind,
        message: String,
    },

    /// The manifest was fetched but is malformed.
    #[error("Malformed bean '{package}': {message}")]
    ManifestSyntax { package: String, message: String },

    /// A pinned bean did not match its recorded digest.
    #[error("Integrity check failed for '{package}': expected sha256 {expected}, got {actual}")]
    IntegrityMismatch {
        package: String,
        expected: String,
        actual: String,
    },

    /// Dependency cycle detected. The path starts and ends with the same name.
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// An install or uninstall script returned non-zero or could not start.
    #[error("Script for '{package}' failed{}: {message}", exit_suffix(.code))]
    ScriptExecution {
        package: String,
        code: Option<i32>,
        message: String,
    },

    /// Installation stopped at a package; earlier packages stay installed.
    #[error("Installation of '{package}' failed: {source}")]
    InstallFailed {
        package: String,
        #[source]
        source: Box<EspressoError>,
    },

    /// A package's script ran but the registry could not record the change.
    ///
    /// The system state and the durable registry disagree about `package`
    /// until the next successful flush.
    #[error("Registry was not updated for '{package}': {source}")]
    RegistryFlushFailed {
        package: String,
        #[source]
        source: Box<EspressoError>,
    },

    /// A dependency chain is deeper than the resolver follows.
    #[error("Dependency chain reaching '{package}' is deeper than {limit} levels")]
    DependencyTooDeep { package: String, limit: usize },

    /// Remove was requested for a package that is not installed.
    #[error("Package '{package}' is not installed")]
    NotInstalled { package: String },

    /// Reading or writing the installed-package registry failed.
    #[error("Registry I/O error at {path}: {message}")]
    RegistryIo { path: PathBuf, message: String },

    /// A package name is empty or contains characters beans cannot use.
    #[error("Invalid package name: '{name}'")]
    InvalidPackageName { name: String },

    /// The operation was cancelled between two plan entries.
    #[error("Installation cancelled after {completed} package(s)")]
    Cancelled { completed: usize },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The operation needs privileges the process does not have.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

impl EspressoError {
    /// Name of the package this error pertains to, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::ManifestFetch { package, .. }
            | Self::ManifestSyntax { package, .. }
            | Self::IntegrityMismatch { package, .. }
            | Self::ScriptExecution { package, .. }
            | Self::InstallFailed { package, .. }
            | Self::RegistryFlushFailed { package, .. }
            | Self::DependencyTooDeep { package, .. }
            | Self::NotInstalled { package } => Some(package),
            _ => None,
        }
    }
}

/// Result type alias for espresso operations.
pub type Result<T> = std::result::Result<T, EspressoError>;
