//! Configuration management for Member Base.
//!
//! Settings are read from `config.toml` in the user configuration directory.
//! Every section is optional; missing keys fall back to the defaults of the
//! running build.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::logging::{BuildContext, LogLevel, LoggerConfig};
use crate::plugin::PluginType;
use crate::security::{Sanitizer, DEFAULT_MASK, DEFAULT_MAX_DEPTH};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logger overrides
    pub logging: LoggingSection,

    /// Sanitizer settings
    pub sanitization: SanitizationSection,

    /// Manifest acceptance rules
    pub manifest: ManifestSection,
}

/// Logger overrides. Unset keys keep the build defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_level: Option<LogLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_in_production: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_console: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_file_logging: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitize_data: Option<bool>,
}

impl LoggingSection {
    /// Apply the overrides that are set.
    pub fn apply(&self, config: &mut LoggerConfig) {
        if let Some(level) = self.min_level {
            config.min_level = level;
        }
        if let Some(enabled) = self.enable_in_production {
            config.enable_in_production = enabled;
        }
        if let Some(enabled) = self.enable_console {
            config.enable_console = enabled;
        }
        if let Some(enabled) = self.enable_file_logging {
            config.enable_file_logging = enabled;
        }
        if let Some(enabled) = self.sanitize_data {
            config.sanitize_data = enabled;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Sanitizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizationSection {
    /// Depth bound for nested data
    pub max_depth: usize,

    /// Mask character for sensitive strings
    pub mask: char,

    /// Field name tokens treated as sensitive in addition to the built-in list
    pub extra_sensitive_fields: Vec<String>,
}

impl Default for SanitizationSection {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, mask: DEFAULT_MASK, extra_sensitive_fields: Vec::new() }
    }
}

/// Manifest acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSection {
    /// Plugin kinds the host accepts
    pub allowed_types: Vec<PluginType>,
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self { allowed_types: PluginType::ALL.to_vec() }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns defaults when no config file exists.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::APP_NAME))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Build a sanitizer from the `[sanitization]` section.
    ///
    /// The CLI installs it on the default logger and uses it for `sanitize`.
    pub fn sanitizer(&self) -> Sanitizer {
        self.sanitization.extra_sensitive_fields.iter().fold(
            Sanitizer::new()
                .with_mask(self.sanitization.mask)
                .with_max_depth(self.sanitization.max_depth),
            |sanitizer, field| sanitizer.with_sensitive_pattern(field.as_str()),
        )
    }

    /// Logger configuration for `build` with the `[logging]` overrides applied.
    pub fn logger_config(&self, build: BuildContext) -> LoggerConfig {
        let mut config = LoggerConfig::for_build(build);
        self.logging.apply(&mut config);
        config
    }

    pub fn allows(&self, plugin_type: PluginType) -> bool {
        self.manifest.allowed_types.contains(&plugin_type)
    }
}
