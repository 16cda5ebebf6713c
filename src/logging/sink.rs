//! Log records and the sinks that receive them.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use super::LogLevel;

/// A single emitted log call, already sanitized.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub context: Option<String>,
    pub message: String,
    pub args: Vec<Value>,
    pub error: Option<Value>,
}

impl LogRecord {
    /// `<ISO-8601> [<context>] [<LEVEL>] <message>`, context omitted when absent.
    pub fn prefix(&self) -> String {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        match &self.context {
            Some(context) => {
                format!("{} [{}] [{}] {}", timestamp, context, self.level.label(), self.message)
            }
            None => format!("{} [{}] {}", timestamp, self.level.label(), self.message),
        }
    }

    /// Prefix followed by the arguments and error rendered as JSON.
    pub fn line(&self) -> String {
        let mut line = self.prefix();
        for arg in self.args.iter().chain(self.error.iter()) {
            line.push(' ');
            match arg {
                Value::String(text) => line.push_str(text),
                other => line.push_str(&other.to_string()),
            }
        }
        line
    }
}

/// Destination for emitted records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord);
}

/// Forwards records to `tracing` at the matching severity.
///
/// The prefix becomes the event message; arguments and the reduced error are
/// recorded as the JSON fields `args` and `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        let prefix = record.prefix();
        let args = Value::Array(record.args.clone());
        let error = record.error.as_ref().map(tracing::field::display);
        match record.level {
            LogLevel::Debug => tracing::debug!(args = %args, error, "{}", prefix),
            LogLevel::Info => tracing::info!(args = %args, error, "{}", prefix),
            LogLevel::Warn => tracing::warn!(args = %args, error, "{}", prefix),
            LogLevel::Error => tracing::error!(args = %args, error, "{}", prefix),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.lock().iter().map(LogRecord::line).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for CaptureSink {
    fn emit(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}
