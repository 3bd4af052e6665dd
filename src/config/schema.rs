//! Configuration schema.
//!
//! Maps the YAML configuration file onto [`EspressoConfig`]. Every field
//! has a default, so an empty or missing file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::bean::DEFAULT_SOURCE;
use crate::shell::DEFAULT_SHELL;

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EspressoConfig {
    /// Bean source: an http(s) URL, a `file://` URL or a directory path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Directory holding the installed-package registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Shell used to run bean scripts
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Timeout for remote bean fetches
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Refuse to install or remove unless running as root
    #[serde(default, skip_serializing_if = "is_false")]
    pub require_root: bool,

    /// Expected SHA-256 digests of bean content, by package name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub pins: HashMap<String, String>,
}

impl Default for EspressoConfig {
    fn default() -> Self {
        Self {
            source: None,
            state_dir: None,
            shell: default_shell(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            require_root: false,
            pins: HashMap::new(),
        }
    }
}

impl EspressoConfig {
    /// The bean source location, falling back to the public repository.
    pub fn source_location(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    /// The registry directory, falling back to the platform data dir.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Fetch timeout as a duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Replace file values with command-line values where given.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(source) = &overrides.source {
            self.source = Some(source.clone());
        }
        if let Some(state_dir) = &overrides.state_dir {
            self.state_dir = Some(state_dir.clone());
        }
    }
}

/// Values supplied on the command line that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<String>,
    pub state_dir: Option<PathBuf>,
}

/// `<data_dir>/espresso`, or `./.espresso` when the platform has none.
pub fn default_state_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("espresso"),
        None => PathBuf::from(".espresso"),
    }
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: EspressoConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, EspressoConfig::default());
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(!config.require_root);
    }

    #[test]
    fn parses_all_fields() {
        let yaml = r#"
source: /srv/beans
state_dir: /var/lib/espresso
shell: /bin/sh
fetch_timeout_secs: 5
require_root: true
pins:
  vim: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
"#;
        let config: EspressoConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source_location(), "/srv/beans");
        assert_eq!(config.state_dir(), PathBuf::from("/var/lib/espresso"));
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(config.fetch_timeout_secs, 5);
        assert!(config.require_root);
        assert!(config.pins.contains_key("vim"));
    }

    #[test]
    fn source_defaults_to_public_repository() {
        assert_eq!(EspressoConfig::default().source_location(), DEFAULT_SOURCE);
    }

    #[test]
    fn state_dir_defaults_under_data_dir() {
        let dir = EspressoConfig::default().state_dir();
        assert!(dir.ends_with("espresso") || dir.ends_with(".espresso"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = EspressoConfig {
            source: Some("https://example.com/beans".to_string()),
            ..Default::default()
        };
        config.apply_overrides(&ConfigOverrides {
            source: Some("/tmp/beans".to_string()),
            state_dir: Some(PathBuf::from("/tmp/state")),
        });
        assert_eq!(config.source_location(), "/tmp/beans");
        assert_eq!(config.state_dir(), PathBuf::from("/tmp/state"));
    }

    #[test]
    fn empty_overrides_keep_file_values() {
        let mut config = EspressoConfig {
            source: Some("/srv/beans".to_string()),
            ..Default::default()
        };
        config.apply_overrides(&ConfigOverrides::default());
        assert_eq!(config.source_location(), "/srv/beans");
    }

    #[test]
    fn serializing_defaults_omits_optional_fields() {
        let yaml = serde_yaml::to_string(&EspressoConfig::default()).unwrap();
        assert!(!yaml.contains("source"));
        assert!(!yaml.contains("pins"));
        assert!(yaml.contains("shell"));
    }
}
