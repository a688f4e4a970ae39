//! Configuration for the `jsonteng` command.
//!
//! The configuration file is optional TOML:
//!
//! ```toml
//! # Base directory for relative template paths
//! template_home = "~/templates"
//! # Print parameter usage statistics after resolving
//! stats = false
//! # Compact JSON output
//! raw = false
//!
//! # Environment binding, searched after all binding data
//! [env]
//! region = "us-west-2"
//! ```
//!
//! # File Location
//!
//! 1. The path given with `--config`
//! 2. The path in `$JSONTENG_CONFIG`
//! 3. `jsonteng/config.toml` in the platform configuration directory
//!    (`~/.config` on Linux, `~/Library/Application Support` on macOS,
//!    `%APPDATA%` on Windows)
//!
//! A missing file at the default locations yields the default configuration; a
//! missing file named explicitly is an error.
//!
//! # Environment Overrides
//!
//! `$TEMPLATE_HOME` overrides `template_home`. Leading `~` in `template_home` is
//! expanded to the home directory.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "JSONTENG_CONFIG";

/// Environment variable overriding `template_home`
pub const TEMPLATE_HOME_ENV_VAR: &str = "TEMPLATE_HOME";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Base directory for relative template paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_home: Option<String>,

    /// Print usage statistics after resolving
    pub stats: bool,

    /// Print compact instead of pretty JSON
    pub raw: bool,

    /// Environment binding
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub env: Map<String, Value>,
}

impl EngineConfig {
    /// Load the configuration following the lookup order described in the
    /// module documentation, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file does not exist, or if the
    /// selected file cannot be read or parsed.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                if !path.exists() {
                    bail!("Configuration file {} does not exist", path.display());
                }
                Self::load_from(&path).await?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path).await?,
                _ => Self::default(),
            },
        };

        if let Ok(home) = std::env::var(TEMPLATE_HOME_ENV_VAR)
            && !home.is_empty()
        {
            debug!("Using template home from ${TEMPLATE_HOME_ENV_VAR}: {home}");
            config.template_home = Some(home);
        }
        Ok(config)
    }

    /// Load the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration
    /// TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration from {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `jsonteng/config.toml` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jsonteng").join("config.toml"))
    }

    /// The template home with `~` expanded.
    pub fn template_home(&self) -> Option<PathBuf> {
        self.template_home
            .as_deref()
            .map(|home| PathBuf::from(shellexpand::tilde(home).into_owned()))
    }

    /// The environment binding as a JSON object.
    pub fn env_binding(&self) -> Value {
        Value::Object(self.env.clone())
    }
}
