//! Core plugin types.

use serde::{Deserialize, Serialize};

/// Kind of plugin. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginType {
    /// Core plugin - shipped with every tenant app.
    CorePlugin,
    /// Segment plugin - enabled for a business segment.
    SegmentPlugin,
    /// Company plugin - built for a single company.
    CompanyPlugin,
}

impl PluginType {
    pub const ALL: [Self; 3] = [Self::CorePlugin, Self::SegmentPlugin, Self::CompanyPlugin];

    /// Literal tag used in manifests.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CorePlugin => "core-plugin",
            Self::SegmentPlugin => "segment-plugin",
            Self::CompanyPlugin => "company-plugin",
        }
    }

    /// Get the display name for this plugin type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CorePlugin => "Core",
            Self::SegmentPlugin => "Segment",
            Self::CompanyPlugin => "Company",
        }
    }

    /// Parse a manifest tag; matching is exact.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl std::fmt::Display for PluginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A screen route exported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRoute {
    /// Route name.
    pub name: String,
    /// Navigation path.
    pub path: String,
    /// Component rendered for this route.
    pub component: String,
    /// Permissions required to open the route.
    pub permissions: Vec<String>,
}

/// Manifest file names recognised when scanning a directory.
pub const MANIFEST_FILES: &[&str] = &["plugin.json", "plugin.toml"];

/// Default plugin catalog file name.
pub const CATALOG_FILE: &str = "plugins.json";
