//! espresso - a minimal package manager.
//!
//! Packages are described by *beans*: small shell scripts that declare
//! their dependencies on a `depends=(...)` line. Installing a package
//! resolves the full dependency graph first, then runs each missing
//! package's script in dependency order and records it in a persistent
//! registry.
//!
//! # Modules
//!
//! - [`bean`] - Bean sources, grammar, and manifest fetching
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Dependency resolution and install orchestration
//! - [`shell`] - Shell script execution
//! - [`state`] - The installed-package registry
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use espresso::bean::{Manifest, Script};
//! use espresso::runner::Resolver;
//! use espresso::state::{MemoryBackend, Registry};
//!
//! let registry = Registry::load(MemoryBackend::new()).unwrap();
//! let plan = Resolver::new(&registry)
//!     .plan("app", |name| {
//!         let deps: Vec<String> = match name {
//!             "app" => vec!["lib".to_string()],
//!             _ => Vec::new(),
//!         };
//!         Manifest::new(name, deps, Script::new("true"))
//!     })
//!     .unwrap();
//! assert_eq!(plan.names(), ["lib", "app"]);
//! ```

pub mod bean;
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod state;
pub mod ui;

pub use error::{EspressoError, Result};
