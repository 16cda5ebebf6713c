//! Plugin system error types.

use std::path::PathBuf;
use thiserror::Error;

use super::{FieldError, PluginType};

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur while loading or validating plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Manifest or catalog file not found.
    #[error("Plugin file not found: {0}")]
    NotFound(PathBuf),

    /// Manifest failed validation; one `field: message` line per defect.
    #[error("Invalid plugin manifest:\n{}", render_field_errors(.errors))]
    InvalidManifest { errors: Vec<FieldError> },

    /// Input could not be parsed as JSON/TOML, or has the wrong top-level shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Referenced plugin id is not in the catalog.
    #[error("Unknown plugin '{0}'")]
    UnknownPlugin(String),

    /// Plugin kind rejected by host policy.
    #[error("Plugin '{id}' has type '{plugin_type}' which is not allowed by this host")]
    TypeNotAllowed { id: String, plugin_type: PluginType },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

impl PluginError {
    /// Field errors carried by an `InvalidManifest` error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::InvalidManifest { errors } => errors,
            _ => &[],
        }
    }
}
