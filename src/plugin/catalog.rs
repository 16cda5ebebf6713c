//! Plugin catalog (`plugins.json`).
//!
//! The catalog maps plugin ids to their manifests. Tenant configurations
//! refer to plugins by these ids.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use super::{validate_manifest, FieldError, PluginError, PluginResult, ValidationReport};

/// Plugins known to the app, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginCatalog {
    entries: BTreeMap<String, Value>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON object.
    pub fn from_json(content: &str) -> PluginResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| PluginError::Parse(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self { entries: map.into_iter().collect() }),
            _ => Err(PluginError::Parse("plugin catalog must contain a JSON object".to_string())),
        }
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> PluginResult<Self> {
        if !path.exists() {
            return Err(PluginError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: Value) {
        self.entries.insert(id.into(), entry);
    }

    /// Plugin ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    /// Look up a plugin, failing for unknown ids.
    pub fn require(&self, id: &str) -> PluginResult<&Value> {
        self.get(id).ok_or_else(|| PluginError::UnknownPlugin(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every entry as a manifest.
    ///
    /// An entry whose `id` disagrees with its catalog key gets an extra `id` error.
    pub fn validate_entries(&self) -> Vec<(String, ValidationReport)> {
        self.entries
            .iter()
            .map(|(key, entry)| {
                let mut report = validate_manifest(entry);
                if let Some(id) = entry.get("id").and_then(Value::as_str) {
                    if !id.trim().is_empty() && id != key {
                        report.errors.push(FieldError::new(
                            "id",
                            format!("id '{}' does not match catalog key '{}'", id, key),
                        ));
                        report.valid = false;
                    }
                }
                (key.clone(), report)
            })
            .collect()
    }
}
