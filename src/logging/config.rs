//! Logger configuration and the shared configuration handle.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::LogLevel;

/// Whether the host is a development or production build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildContext {
    Development,
    Production,
}

impl BuildContext {
    /// Build context of the running binary (debug assertions mean development).
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Lowest level that is emitted
    pub min_level: LogLevel,

    /// Emit at all in a production build
    pub enable_in_production: bool,

    /// Emit to the primary (console) sink
    pub enable_console: bool,

    /// Emit to the secondary (file) sink, if one is attached
    pub enable_file_logging: bool,

    /// Sanitize arguments before emission
    pub sanitize_data: bool,
}

impl LoggerConfig {
    /// Defaults for a build context.
    ///
    /// Production always starts with `enable_in_production` off.
    pub fn for_build(build: BuildContext) -> Self {
        let development = build.is_development();
        Self {
            min_level: if development { LogLevel::Debug } else { LogLevel::Warn },
            enable_in_production: false,
            enable_console: development,
            enable_file_logging: false,
            sanitize_data: true,
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::for_build(BuildContext::current())
    }
}

/// Configuration shared between a logger and its children.
///
/// Readers take an immutable snapshot; writers build a replacement and swap
/// it in under the write lock, so nobody observes a half-applied update.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<LoggerConfig>>>,
}

impl SharedConfig {
    pub fn new(config: LoggerConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(config))) }
    }

    /// Current configuration snapshot.
    pub fn snapshot(&self) -> Arc<LoggerConfig> {
        self.inner.read().clone()
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: LoggerConfig) {
        *self.inner.write() = Arc::new(config);
    }

    /// Apply a partial update to a copy of the current configuration and swap it in.
    pub fn update(&self, apply: impl FnOnce(&mut LoggerConfig)) {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        apply(&mut next);
        *guard = Arc::new(next);
    }

    /// Whether two handles point at the same configuration.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
