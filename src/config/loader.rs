//! Configuration file discovery and loading.
//!
//! A single file is used, found in this order:
//! 1. The `--config` path
//! 2. `$ESPRESSO_CONFIG`
//! 3. `<config_dir>/espresso/config.yml`
//!
//! An explicitly named file must exist. The default location may be
//! absent, in which case the defaults apply.

use crate::config::schema::EspressoConfig;
use crate::error::{EspressoError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "ESPRESSO_CONFIG";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named by the user; must exist.
    Explicit(PathBuf),
    /// The platform default; may be absent.
    Default(PathBuf),
    /// No config directory on this platform.
    None,
}

impl ConfigLocation {
    /// Discover the config location from the process environment.
    pub fn discover(config_override: Option<&Path>) -> Self {
        Self::resolve(
            config_override,
            std::env::var_os(CONFIG_ENV),
            dirs::config_dir(),
        )
    }

    /// Pick a location from an override, an environment value and a
    /// config directory.
    pub fn resolve(
        config_override: Option<&Path>,
        env_value: Option<OsString>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = config_override {
            return Self::Explicit(path.to_path_buf());
        }
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            return Self::Explicit(PathBuf::from(value));
        }
        match config_dir {
            Some(dir) => Self::Default(dir.join("espresso").join("config.yml")),
            None => Self::None,
        }
    }

    /// The file path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Default(path) => Some(path),
            Self::None => None,
        }
    }
}

/// Load and validate the configuration.
pub fn load_config(config_override: Option<&Path>) -> Result<EspressoConfig> {
    load_from(&ConfigLocation::discover(config_override))
}

/// Load and validate the configuration at a resolved location.
pub fn load_from(location: &ConfigLocation) -> Result<EspressoConfig> {
    let config = match location {
        ConfigLocation::Explicit(path) => load_config_file(path)?,
        ConfigLocation::Default(path) if path.exists() => load_config_file(path)?,
        ConfigLocation::Default(path) => {
            tracing::debug!("no config at {}, using defaults", path.display());
            EspressoConfig::default()
        }
        ConfigLocation::None => EspressoConfig::default(),
    };

    crate::config::validator::validate(&config)?;
    Ok(config)
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigParseError` if the file is missing or the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<EspressoConfig> {
    let content = fs::read_to_string(path).map_err(|e| EspressoError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into an [`EspressoConfig`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<EspressoConfig> {
    if content.trim().is_empty() {
        return Ok(EspressoConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| EspressoError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn override_wins_over_env_and_default() {
        let location = ConfigLocation::resolve(
            Some(Path::new("/a.yml")),
            Some(OsString::from("/b.yml")),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(location, ConfigLocation::Explicit(PathBuf::from("/a.yml")));
    }

    #[test]
    fn env_wins_over_default() {
        let location = ConfigLocation::resolve(
            None,
            Some(OsString::from("/b.yml")),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(location, ConfigLocation::Explicit(PathBuf::from("/b.yml")));
    }

    #[test]
    fn empty_env_is_ignored() {
        let location = ConfigLocation::resolve(
            None,
            Some(OsString::new()),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(
            location,
            ConfigLocation::Default(PathBuf::from("/home/u/.config/espresso/config.yml"))
        );
    }

    #[test]
    fn no_config_dir_means_no_location() {
        let location = ConfigLocation::resolve(None, None, None);
        assert_eq!(location, ConfigLocation::None);
        assert!(location.path().is_none());
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let location = ConfigLocation::Default(temp.path().join("config.yml"));

        let config = load_from(&location).unwrap();
        assert_eq!(config, EspressoConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let location = ConfigLocation::Explicit(temp.path().join("nope.yml"));

        let result = load_from(&location);
        assert!(matches!(result, Err(EspressoError::ConfigParseError { .. })));
    }

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yml");
        fs::write(&config_path, "shell: /bin/sh\nfetch_timeout_secs: 10\n").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn load_config_file_handles_empty_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yml");
        fs::write(&config_path, "").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config, EspressoConfig::default());
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("invalid: yaml: content: [", Path::new("test.yml"));
        assert!(matches!(result, Err(EspressoError::ConfigParseError { .. })));
    }

    #[test]
    fn parse_config_rejects_wrong_types() {
        let result = parse_config("fetch_timeout_secs: soon", Path::new("test.yml"));
        assert!(matches!(result, Err(EspressoError::ConfigParseError { .. })));
    }

    #[test]
    fn load_from_validates() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yml");
        fs::write(&config_path, "fetch_timeout_secs: 0\n").unwrap();

        let result = load_from(&ConfigLocation::Explicit(config_path));
        assert!(matches!(
            result,
            Err(EspressoError::ConfigValidationError { .. })
        ));
    }
}
