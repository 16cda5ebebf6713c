//! Plugin manifest validation.
//!
//! A manifest arrives as untyped JSON (or TOML) from the plugin packaging
//! step. [`validate_manifest`] checks it against the manifest schema and
//! reports every defect at once; only input that passes is turned into a
//! typed [`PluginManifest`] by [`parse_manifest`].

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PluginError, PluginResult, PluginRoute, PluginType};

static SEMVER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$")
        .expect("semver pattern is valid")
});

/// A validation failure tied to a manifest field path such as `routes[2].name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating one manifest. `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Field paths that failed, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Convert into a `PluginError` when invalid.
    pub fn into_result(self) -> PluginResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(PluginError::InvalidManifest { errors: self.errors })
        }
    }
}

/// A manifest that has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Semantic version.
    pub version: String,
    /// Plugin kind.
    #[serde(rename = "type")]
    pub plugin_type: PluginType,
    /// Short description.
    pub description: String,
    /// Ids of plugins this one depends on.
    pub dependencies: Vec<String>,
    /// Exported symbols, opaque to the validator.
    pub exports: Map<String, Value>,
    /// Permissions the plugin requests.
    pub permissions: Vec<String>,
    /// Screen routes, if the plugin contributes any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<PluginRoute>>,
}

impl PluginManifest {
    /// Parse and validate a manifest from a JSON string.
    pub fn from_json(content: &str) -> PluginResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| PluginError::Parse(e.to_string()))?;
        parse_manifest(&value)
    }

    /// Parse and validate a manifest from a TOML string.
    pub fn from_toml(content: &str) -> PluginResult<Self> {
        let value: Value = toml::from_str(content).map_err(|e| PluginError::Parse(e.to_string()))?;
        parse_manifest(&value)
    }

    /// Parse a manifest file; `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: &Path) -> PluginResult<Self> {
        if !path.exists() {
            return Err(PluginError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> PluginResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PluginError::Parse(e.to_string()))
    }

    pub fn route(&self, name: &str) -> Option<&PluginRoute> {
        self.routes.as_ref()?.iter().find(|route| route.name == name)
    }

    pub fn requests_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Reject the manifest if its kind is not in `allowed`.
    pub fn check_allowed(&self, allowed: &[PluginType]) -> PluginResult<()> {
        if allowed.contains(&self.plugin_type) {
            Ok(())
        } else {
            Err(PluginError::TypeNotAllowed { id: self.id.clone(), plugin_type: self.plugin_type })
        }
    }
}

fn is_non_empty_string(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty())
}

fn check_non_empty_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) {
    if !is_non_empty_string(object.get(field)) {
        errors.push(FieldError::new(field, format!("{} must be a non-empty string", field)));
    }
}

fn check_version(object: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    match object.get("version").and_then(Value::as_str) {
        None => errors.push(FieldError::new("version", "version must be a string")),
        Some(version) if !SEMVER_PATTERN.is_match(version) => errors.push(FieldError::new(
            "version",
            "version must follow semantic versioning (MAJOR.MINOR.PATCH)",
        )),
        Some(_) => {}
    }
}

fn check_type(object: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    let known = object.get("type").and_then(Value::as_str).and_then(PluginType::from_tag);
    if known.is_none() {
        let tags: Vec<&str> = PluginType::ALL.iter().map(|kind| kind.tag()).collect();
        errors.push(FieldError::new("type", format!("type must be one of: {}", tags.join(", "))));
    }
}

fn check_routes(routes: &Value, errors: &mut Vec<FieldError>) {
    let Some(routes) = routes.as_array() else {
        errors.push(FieldError::new("routes", "routes must be an array"));
        return;
    };

    for (index, route) in routes.iter().enumerate() {
        let prefix = format!("routes[{}]", index);
        let Some(route) = route.as_object() else {
            errors.push(FieldError::new(&prefix, "route must be an object"));
            continue;
        };

        for key in ["name", "path", "component"] {
            if !is_non_empty_string(route.get(key)) {
                errors.push(FieldError::new(
                    format!("{}.{}", prefix, key),
                    format!("route {} is required", key),
                ));
            }
        }

        if !route.get("permissions").is_some_and(Value::is_array) {
            errors.push(FieldError::new(
                format!("{}.permissions", prefix),
                "route permissions must be an array",
            ));
        }
    }
}

/// Validate an untyped manifest, reporting every failing field.
///
/// Never fails; non-object input yields a single `manifest` error.
pub fn validate_manifest(manifest: &Value) -> ValidationReport {
    let Some(object) = manifest.as_object() else {
        return ValidationReport::from_errors(vec![FieldError::new(
            "manifest",
            "manifest must be an object",
        )]);
    };

    let mut errors = Vec::new();

    check_non_empty_string(object, "id", &mut errors);
    check_non_empty_string(object, "name", &mut errors);
    check_version(object, &mut errors);
    check_type(object, &mut errors);
    check_non_empty_string(object, "description", &mut errors);

    if !object.get("dependencies").is_some_and(Value::is_array) {
        errors.push(FieldError::new("dependencies", "dependencies must be an array"));
    }
    if !object.get("exports").is_some_and(Value::is_object) {
        errors.push(FieldError::new("exports", "exports must be an object"));
    }
    if !object.get("permissions").is_some_and(Value::is_array) {
        errors.push(FieldError::new("permissions", "permissions must be an array"));
    }

    if let Some(routes) = object.get("routes") {
        check_routes(routes, &mut errors);
    }

    ValidationReport::from_errors(errors)
}

/// Validate `manifest` and convert it into a typed [`PluginManifest`].
///
/// All field errors are returned together in [`PluginError::InvalidManifest`].
pub fn parse_manifest(manifest: &Value) -> PluginResult<PluginManifest> {
    validate_manifest(manifest).into_result()?;
    PluginManifest::deserialize(manifest).map_err(|e| PluginError::Parse(e.to_string()))
}
