//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use espresso::config::{load_config, ConfigOverrides};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "source: /srv/beans").unwrap();
//!
//! let mut config = load_config(Some(&path)).unwrap();
//! config.apply_overrides(&ConfigOverrides {
//!     state_dir: Some(temp.path().join("state")),
//!     ..Default::default()
//! });
//! assert_eq!(config.source_location(), "/srv/beans");
//! assert_eq!(config.state_dir(), temp.path().join("state"));
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    load_config, load_config_file, load_from, parse_config, ConfigLocation, CONFIG_ENV,
};
pub use schema::{default_state_dir, ConfigOverrides, EspressoConfig};
pub use validator::{validate, validate_config, ValidationError};
