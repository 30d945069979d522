use crate::error::ConfigError;
use crate::io::protocol::Operation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub protocol: ProtocolConfig,
    pub navigation: NavigationConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

/// Request URIs for each backend operation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ProtocolConfig {
    pub init_dir: String,
    pub go_to_dir: String,
    pub element_info: String,
    pub open_file: String,
}

/// Selection and filtering behaviour
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Wrap around when stepping past the first or last row
    pub wrap_selection: bool,
    /// Match filter prefixes case-sensitively
    pub case_sensitive_filter: bool,
}

/// Local filesystem backend settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Show hidden files
    pub show_hidden: bool,
    /// Maximum number of characters returned for a file preview
    pub preview_limit: usize,
    /// Directory to start in; home directory when unset
    pub start_dir: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            init_dir: "initDir".to_string(),
            go_to_dir: "goToDir".to_string(),
            element_info: "elementInfo".to_string(),
            open_file: "openFile".to_string(),
        }
    }
}

impl ProtocolConfig {
    pub fn uri(&self, operation: Operation) -> &str {
        match operation {
            Operation::InitDirectory => &self.init_dir,
            Operation::NavigateToDirectory => &self.go_to_dir,
            Operation::GetElementInfo => &self.element_info,
            Operation::OpenFile => &self.open_file,
        }
    }

    pub fn operation(&self, uri: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| self.uri(*op) == uri)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            wrap_selection: true,
            case_sensitive_filter: false,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            show_hidden: false,
            preview_limit: 100_000,
            start_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "navpane=info,warn".to_string(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "navpane")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "using default configuration");
                    Config::default()
                }
            },
            _ => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
