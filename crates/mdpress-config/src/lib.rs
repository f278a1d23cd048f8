//! Configuration management for mdpress.
//!
//! Parses `mdpress.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `drive.client_id`
//! - `drive.client_secret`
//! - `drive.refresh_token`
//! - `drive.access_token`
//! - `drive.folder_id`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpress.toml";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML.
    #[error("failed to parse {path}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Referenced environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVar {
        /// Variable name.
        name: String,
    },

    /// Semantic validation failure.
    #[error("{0}")]
    Validation(String),
}

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override fallback directory.
    pub fallback_dir: Option<PathBuf>,
    /// Override delivery response mode.
    pub mode: Option<DeliveryMode>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Delivery response mode configuration.
    pub delivery: DeliveryConfig,
    /// Local fallback backend configuration.
    pub fallback: FallbackConfig,
    /// Remote Drive backend configuration (optional section; absent means
    /// no remote backend in the chain).
    pub drive: Option<DriveSection>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            delivery: DeliveryConfig::default(),
            fallback: FallbackConfig::default(),
            drive: None,
            config_path: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// How the conversion endpoint responds.
///
/// The two modes are mutually exclusive per deployment, never combined per
/// request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Upload through the storage chain and return a download URL.
    #[default]
    Upload,
    /// Stream the PDF bytes back directly with attachment disposition.
    Direct,
}

/// Delivery response mode configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Response mode for the conversion endpoint.
    pub mode: DeliveryMode,
}

/// Local fallback backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Whether the local fallback backend is in the chain. Disabling it is
    /// the only deployment where a delivery can fail outright.
    pub enabled: bool,
    /// Directory rendered documents are written into.
    pub dir: PathBuf,
    /// Public base path under which the server exposes that directory.
    pub public_base: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("exports"),
            public_base: "/files".to_owned(),
        }
    }
}

/// Remote Drive backend configuration.
#[derive(Debug, Deserialize)]
pub struct DriveSection {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Pre-issued access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Folder to upload into.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Redirect URI for the consent flow (defaults to the server's
    /// callback endpoint).
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl DriveSection {
    /// Validate that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.client_id, "drive.client_id")?;
        require_non_empty(&self.client_secret, "drive.client_secret")?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from an explicit path or by auto-discovery.
    ///
    /// Searches for `mdpress.toml` upward from the current directory when
    /// no path is given; missing config falls back to defaults. CLI
    /// settings are applied after loading, then expansion and validation
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on read, parse, expansion, or validation
    /// failure.
    pub fn load(path: Option<&Path>, cli: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => Self::discover(),
        };

        let mut config = match &path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let mut config: Self =
                    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                config.config_path = Some(path.clone());
                config
            }
            None => Self::default(),
        };

        if let Some(cli) = cli {
            config.apply_cli(cli);
        }
        config.expand_fields()?;
        config.validate()?;

        Ok(config)
    }

    /// Search for the config file upward from the current directory.
    fn discover() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Apply non-None CLI overrides.
    fn apply_cli(&mut self, cli: &CliSettings) {
        if let Some(host) = &cli.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(dir) = &cli.fallback_dir {
            self.fallback.dir.clone_from(dir);
        }
        if let Some(mode) = cli.mode {
            self.delivery.mode = mode;
        }
    }

    /// Expand environment variable references in string fields.
    fn expand_fields(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand(&self.server.host)?;
        if let Some(drive) = &mut self.drive {
            drive.client_id = expand::expand(&drive.client_id)?;
            drive.client_secret = expand::expand(&drive.client_secret)?;
            drive.refresh_token = expand_opt(drive.refresh_token.take())?;
            drive.access_token = expand_opt(drive.access_token.take())?;
            drive.folder_id = expand_opt(drive.folder_id.take())?;
        }
        Ok(())
    }

    /// Validate the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on semantic problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be non-zero".to_owned(),
            ));
        }
        if self.fallback.enabled {
            require_non_empty(&self.fallback.public_base, "fallback.public_base")?;
        }
        if let Some(drive) = &self.drive {
            drive.validate()?;
        }
        Ok(())
    }
}

/// Expand an optional string field.
fn expand_opt(value: Option<String>) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand::expand(&v)).transpose()
}

/// Require that a field is non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must be set")));
    }
    Ok(())
}
