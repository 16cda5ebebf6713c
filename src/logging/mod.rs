//! Level-gated structured logging.
//!
//! A [`Logger`] formats each call as
//! `<ISO-8601 timestamp> [<context>] [<LEVEL>] <message>`, scrubs every
//! argument through the [`Sanitizer`](crate::security::Sanitizer) and hands the
//! record to a [`LogSink`]. The default sink forwards to `tracing`, so the host
//! decides where output actually goes.
//!
//! # Gating
//!
//! A call at level `L` reaches the console sink only when all of these hold:
//! - the build is a development build, or `enable_in_production` is set
//! - `enable_console` is set
//! - `L >= min_level`
//!
//! # Process-wide logger
//!
//! [`logger()`] returns the default instance, created on first use from the
//! defaults of [`BuildContext::current`]. [`set_config`] and [`get_config`]
//! act on it. Children created with [`Logger::child`] share their parent's
//! configuration, so updating it affects the whole tree.
//!
//! ```
//! use memberbase::logging::{BuildContext, CaptureSink, Logger, LoggerConfig};
//! use std::sync::Arc;
//!
//! let sink = CaptureSink::new();
//! let root = Logger::new(LoggerConfig::for_build(BuildContext::Development))
//!     .with_sink(Arc::new(sink.clone()))
//!     .with_build_context(BuildContext::Development);
//! let api = root.child("api");
//!
//! api.info("request served", &[]);
//! assert_eq!(sink.records()[0].context.as_deref(), Some("api"));
//! ```

mod config;
mod level;
mod sink;

pub use config::{BuildContext, LoggerConfig, SharedConfig};
pub use level::LogLevel;
pub use sink::{CaptureSink, LogRecord, LogSink, TracingSink};

use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;

use crate::security::Sanitizer;

/// Separator between parent and child contexts.
pub const CONTEXT_SEPARATOR: &str = ":";

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new(LoggerConfig::default()));

/// The process-wide default logger.
pub fn logger() -> &'static Logger {
    &DEFAULT_LOGGER
}

/// Apply a partial update to the default logger's configuration.
pub fn set_config(apply: impl FnOnce(&mut LoggerConfig)) {
    DEFAULT_LOGGER.update_config(apply);
}

/// Replace the default logger's configuration.
pub fn replace_config(config: LoggerConfig) {
    DEFAULT_LOGGER.replace_config(config);
}

/// Replace the sanitizer used by the default logger and its children.
pub fn replace_sanitizer(sanitizer: Sanitizer) {
    DEFAULT_LOGGER.replace_sanitizer(sanitizer);
}

/// A copy of the default logger's configuration.
pub fn get_config() -> LoggerConfig {
    DEFAULT_LOGGER.config()
}

/// Structured logger with an optional breadcrumb context.
#[derive(Clone)]
pub struct Logger {
    config: SharedConfig,
    context: Option<String>,
    sink: Arc<dyn LogSink>,
    file_sink: Option<Arc<dyn LogSink>>,
    sanitizer: Arc<RwLock<Arc<Sanitizer>>>,
    build: BuildContext,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("config", &self.config.snapshot())
            .field("build", &self.build)
            .field("file_sink", &self.file_sink.is_some())
            .finish()
    }
}

impl Logger {
    /// Create an independent root logger writing to `tracing`.
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config: SharedConfig::new(config),
            context: None,
            sink: Arc::new(TracingSink),
            file_sink: None,
            sanitizer: Arc::new(RwLock::new(Arc::new(Sanitizer::new()))),
            build: BuildContext::current(),
        }
    }

    /// Use `sink` as the console sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Attach a secondary sink used when `enable_file_logging` is set.
    #[must_use]
    pub fn with_file_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.file_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Arc::new(RwLock::new(Arc::new(sanitizer)));
        self
    }

    /// Swap the sanitizer shared with this logger's children.
    pub fn replace_sanitizer(&self, sanitizer: Sanitizer) {
        *self.sanitizer.write() = Arc::new(sanitizer);
    }

    /// The sanitizer currently applied to arguments and errors.
    pub fn sanitizer(&self) -> Arc<Sanitizer> {
        self.sanitizer.read().clone()
    }

    /// Override the build context used for production gating.
    #[must_use]
    pub fn with_build_context(mut self, build: BuildContext) -> Self {
        self.build = build;
        self
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Derive a child logger sharing this logger's configuration and sinks.
    pub fn child(&self, context: &str) -> Self {
        let context = match &self.context {
            Some(parent) => format!("{}{}{}", parent, CONTEXT_SEPARATOR, context),
            None => context.to_string(),
        };

        Self { context: Some(context), ..self.clone() }
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> LoggerConfig {
        LoggerConfig::clone(&self.config.snapshot())
    }

    pub fn update_config(&self, apply: impl FnOnce(&mut LoggerConfig)) {
        self.config.update(apply);
    }

    pub fn replace_config(&self, config: LoggerConfig) {
        self.config.replace(config);
    }

    /// Whether a call at `level` would reach the console sink.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        let config = self.config.snapshot();
        self.passes_gate(&config, level) && config.enable_console
    }

    pub fn debug(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Debug, message, args, None);
    }

    pub fn info(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Info, message, args, None);
    }

    pub fn warn(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Warn, message, args, None);
    }

    /// Log at error level; `error` is reduced with `sanitize_error` before emission.
    pub fn error(&self, message: &str, error: Option<&(dyn Error + 'static)>, args: &[Value]) {
        self.log(LogLevel::Error, message, args, error);
    }

    fn passes_gate(&self, config: &LoggerConfig, level: LogLevel) -> bool {
        (self.build.is_development() || config.enable_in_production) && level >= config.min_level
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        args: &[Value],
        error: Option<&(dyn Error + 'static)>,
    ) {
        let config = self.config.snapshot();
        if !self.passes_gate(&config, level) {
            return;
        }

        let to_console = config.enable_console;
        let file_sink = self.file_sink.as_ref().filter(|_| config.enable_file_logging);
        if !to_console && file_sink.is_none() {
            return;
        }

        let sanitizer = self.sanitizer();
        let args: Vec<Value> = if config.sanitize_data {
            args.iter().map(|arg| sanitizer.sanitize_for_log(arg)).collect()
        } else {
            args.to_vec()
        };

        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            context: self.context.clone(),
            message: message.to_string(),
            args,
            error: error.map(|err| sanitizer.sanitize_error(err)),
        };

        if to_console {
            self.sink.emit(&record);
        }
        if let Some(file_sink) = file_sink {
            file_sink.emit(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capture(config: LoggerConfig) -> (Logger, CaptureSink) {
        let sink = CaptureSink::new();
        let logger = Logger::new(config)
            .with_sink(Arc::new(sink.clone()))
            .with_build_context(BuildContext::Development);
        (logger, sink)
    }

    fn dev_config() -> LoggerConfig {
        LoggerConfig::for_build(BuildContext::Development)
    }

    #[test]
    fn test_min_level_gating() {
        let (logger, sink) = capture(LoggerConfig { min_level: LogLevel::Warn, ..dev_config() });

        logger.debug("hidden", &[]);
        logger.info("hidden", &[]);
        assert!(sink.is_empty());

        logger.warn("shown", &[]);
        logger.error("shown", None, &[]);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records()[0].level, LogLevel::Warn);
    }

    #[test]
    fn test_console_disabled() {
        let (logger, sink) = capture(LoggerConfig { enable_console: false, ..dev_config() });
        logger.error("dropped", None, &[]);
        assert!(sink.is_empty());
        assert!(!logger.is_enabled(LogLevel::Error));
    }

    #[test]
    fn test_production_requires_opt_in() {
        let (logger, sink) = capture(dev_config());
        let logger = logger.with_build_context(BuildContext::Production);

        logger.error("dropped", None, &[]);
        assert!(sink.is_empty());

        logger.update_config(|c| c.enable_in_production = true);
        logger.error("kept", None, &[]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_child_context_and_shared_config() {
        let (root, sink) = capture(dev_config());
        let grandchild = root.child("user").child("profile");
        assert_eq!(grandchild.context(), Some("user:profile"));

        grandchild.warn("loaded", &[]);
        assert!(sink.lines()[0].contains("[user:profile] [WARN] loaded"));

        root.update_config(|c| c.min_level = LogLevel::Error);
        grandchild.warn("suppressed", &[]);
        assert_eq!(sink.len(), 1);
        assert_eq!(grandchild.config().min_level, LogLevel::Error);
    }

    #[test]
    fn test_arguments_are_sanitized() {
        let (logger, sink) = capture(dev_config());
        logger.info("login", &[json!({ "email": "a@b.co", "password": "hunter2" }), json!(3)]);

        let record = &sink.records()[0];
        assert_eq!(record.args[0], json!({ "email": "a@b.co", "password": "*******" }));
        assert_eq!(record.args[1], json!(3));
    }

    #[test]
    fn test_sanitization_can_be_disabled() {
        let (logger, sink) = capture(LoggerConfig { sanitize_data: false, ..dev_config() });
        logger.info("raw", &[json!({ "token": "abc" })]);
        assert_eq!(sink.records()[0].args[0], json!({ "token": "abc" }));
    }

    #[test]
    fn test_error_value_is_reduced() {
        let (logger, sink) = capture(dev_config());
        let err = std::io::Error::other("connection reset");
        logger.error("request failed", Some(&err), &[]);

        let record = &sink.records()[0];
        let error = record.error.as_ref().unwrap();
        assert_eq!(error["message"], json!("connection reset"));
        assert!(record.line().contains("connection reset"));
    }

    #[test]
    fn test_file_sink_follows_flag() {
        let file = CaptureSink::new();
        let (logger, console) = capture(LoggerConfig { enable_console: false, ..dev_config() });
        let logger = logger.with_file_sink(Arc::new(file.clone()));

        logger.warn("not yet", &[]);
        assert!(file.is_empty());

        logger.update_config(|c| c.enable_file_logging = true);
        logger.warn("to file", &[]);
        assert_eq!(file.len(), 1);
        assert!(console.is_empty());
    }

    #[test]
    fn test_replaced_sanitizer_reaches_children() {
        let (root, sink) = capture(dev_config());
        let child = root.child("member");

        child.info("profile", &[json!({ "nik": "3201" })]);
        root.replace_sanitizer(Sanitizer::new().with_sensitive_pattern("nik").with_mask('#'));
        child.info("profile", &[json!({ "nik": "3201" })]);

        let records = sink.records();
        assert_eq!(records[0].args[0], json!({ "nik": "3201" }));
        assert_eq!(records[1].args[0], json!({ "nik": "####" }));
        assert_eq!(child.sanitizer().mask(), '#');
    }

    #[test]
    fn test_config_returns_copy() {
        let (logger, _) = capture(dev_config());
        let mut copy = logger.config();
        copy.min_level = LogLevel::Error;
        assert_eq!(copy.min_level, LogLevel::Error);
        assert_eq!(logger.config().min_level, LogLevel::Debug);
    }
}
