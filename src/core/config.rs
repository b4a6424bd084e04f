//! Configuration file management.
//!
//! Settings are read from, in order of precedence:
//! 1. the file named by `KUBECRYPT_CONFIG`
//! 2. `.kubecrypt.toml` in the current directory
//! 3. `kubecrypt/config.toml` in the user config directory
//!
//! A missing file is not an error; every setting has a default or can be
//! given on the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::cipher::DataKeyPolicy;
use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Tool configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default KMS key for objects that have none yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Whether re-encryption reuses an object's existing data key.
    #[serde(default)]
    pub data_key_policy: DataKeyPolicy,
    /// AWS client settings.
    #[serde(default)]
    pub aws: AwsSettings,
}

/// AWS client settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Config {
    /// Path of the configuration file in effect, if any.
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(constants::CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(constants::CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("kubecrypt").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load the configuration in effect, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile`, `ConfigError::Parse`, or
    /// `ConfigError::InvalidValue`.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject blank strings.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("key_id", &self.key_id),
            ("aws.region", &self.aws.region),
            ("aws.profile", &self.aws.profile),
        ];
        for (field, value) in fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
