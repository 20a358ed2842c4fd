//! # Terminal Configuration
//!
//! Configuration management for the banking terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BANK_DB_PATH=/var/lib/bank/card.s3db                               │
//! │     BANK_DB_IN_MEMORY=true                                             │
//! │     BANK_CURRENCY_SYMBOL=$                                             │
//! │     BANK_LOG=debug                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $BANK_CONFIG, or                                                   │
//! │     ~/.config/bank/terminal.toml (Linux)                               │
//! │     ~/Library/Application Support/com.simple.bank/terminal.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     card.s3db in the platform data dir, log filter "warn"              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [database]
//! path = "/var/lib/bank/card.s3db"
//! in_memory = false
//! max_connections = 5
//!
//! [display]
//! currency_symbol = ""
//!
//! [logging]
//! filter = "warn,bank_db=info"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Default database file name.
pub const DEFAULT_DB_FILE: &str = "card.s3db";

/// Default config file name.
pub const CONFIG_FILE: &str = "terminal.toml";

// =============================================================================
// Database Settings
// =============================================================================

/// Where cards are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. `None` means `card.s3db` in the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Keep cards in memory only; nothing survives the process.
    #[serde(default)]
    pub in_memory: bool,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            in_memory: false,
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// The database file to open, resolving the platform default.
    ///
    /// Creates the data directory when falling back to the default.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or_else(|| {
            ConfigError::Invalid("Could not determine app data directory".to_string())
        })?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DEFAULT_DB_FILE))
    }
}

// =============================================================================
// Display & Logging Settings
// =============================================================================

/// How amounts are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Printed before every amount, e.g. "$". Empty by default.
    #[serde(default)]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Terminal Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TerminalConfig {
    /// Loads configuration from file, environment variables, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("BANK_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "database.path must not be empty".to_string(),
                ));
            }
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BANK_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("BANK_DB_PATH") {
            debug!(%path, "Overriding database path from env");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("BANK_DB_IN_MEMORY") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.database.in_memory = true,
                "0" | "false" | "no" => self.database.in_memory = false,
                other => warn!(value = other, "Ignoring invalid BANK_DB_IN_MEMORY"),
            }
        }

        if let Some(symbol) = lookup("BANK_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        if let Some(filter) = lookup("BANK_LOG") {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "simple", "bank")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert_eq!(config.database.path, None);
        assert!(!config.database.in_memory);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.display.currency_symbol, "");
        assert_eq!(config.logging.filter, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = TerminalConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = TerminalConfig::default();
        config.database.path = Some(PathBuf::new());
        assert!(config.validate().is_err());

        let mut config = TerminalConfig::default();
        config.logging.filter = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TerminalConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/bank/card.s3db"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/tmp/bank/card.s3db"))
        );
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = TerminalConfig::default();
        config.display.currency_symbol = "$".to_string();
        config.database.in_memory = true;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: TerminalConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BANK_DB_PATH", "/srv/card.s3db"),
            ("BANK_DB_IN_MEMORY", "TRUE"),
            ("BANK_CURRENCY_SYMBOL", "€"),
            ("BANK_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = TerminalConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from("/srv/card.s3db")));
        assert!(config.database.in_memory);
        assert_eq!(config.display.currency_symbol, "€");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_invalid_in_memory_flag_is_ignored() {
        let mut config = TerminalConfig::default();
        config.apply_overrides(|key| (key == "BANK_DB_IN_MEMORY").then(|| "maybe".to_string()));
        assert!(!config.database.in_memory);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[display]\ncurrency_symbol = \"$\"").unwrap();

        let config = TerminalConfig::from_file(&path).unwrap();
        assert_eq!(config.display.currency_symbol, "$");

        std::fs::write(&path, "[database\n").unwrap();
        assert!(matches!(
            TerminalConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_explicit_path_wins() {
        let settings = DatabaseSettings {
            path: Some(PathBuf::from("bank.db")),
            ..DatabaseSettings::default()
        };
        assert_eq!(settings.resolved_path().unwrap(), PathBuf::from("bank.db"));
    }
}
