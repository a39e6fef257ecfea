//! Classifier configuration.
//!
//! Read from a TOML file. Every section is optional; a missing file means
//! defaults. A `[[rules]]` array replaces the built-in rule table.
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [classifier]
//! creators_update_build = 15063
//!
//! [[rules]]
//! name = "Windows 10"
//! major = 10
//! minor = 0
//! discriminator = { kind = "workstation" }
//! ```

use crate::classifier::{EditionClassifier, CREATORS_UPDATE_BUILD};
use crate::error::ConfigError;
use crate::rules::{RuleTable, VersionRule};
use crate::sku::SkuRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "WINEDITION_CONFIG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter directive, e.g. "warn" or "winedition=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Minimum build for the Creators Update check
    #[serde(default = "default_creators_update_build")]
    pub creators_update_build: u32,
}

fn default_creators_update_build() -> u32 {
    CREATORS_UPDATE_BUILD
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            creators_update_build: default_creators_update_build(),
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Replaces the built-in table when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<VersionRule>>,
}

impl ClassifierConfig {
    /// Load from `$WINEDITION_CONFIG`.
    ///
    /// An unset variable or a missing file yields defaults. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Ok(Self::default());
        };
        let path = PathBuf::from(path);
        match Self::load_from(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), custom_rules = config.rules.is_some(), "loaded config");
        Ok(config)
    }

    /// Parse and validate (a custom rule table must be non-empty with unique names)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.rule_table()?;
        Ok(config)
    }

    /// Custom rules if configured, otherwise the built-in table
    pub fn rule_table(&self) -> Result<Arc<RuleTable>, ConfigError> {
        match &self.rules {
            Some(rules) => Ok(Arc::new(RuleTable::from_rules(rules.clone())?)),
            None => Ok(RuleTable::builtin()),
        }
    }

    pub fn build_classifier(&self) -> Result<EditionClassifier, ConfigError> {
        Ok(
            EditionClassifier::with_tables(self.rule_table()?, SkuRegistry::builtin())
                .with_creators_update_build(self.classifier.creators_update_build),
        )
    }
}
