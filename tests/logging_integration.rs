//! Logging integration tests.
//!
//! Tests that touch the process-wide logger run serially; everything else
//! builds its own root logger over a capture sink.

use std::sync::Arc;

use chrono::DateTime;
use memberbase::logging::{
    self, BuildContext, CaptureSink, LogLevel, LogRecord, LogSink, Logger, LoggerConfig,
};
use memberbase::security::ValidationError;
use parking_lot::Mutex;
use serde_json::json;
use serial_test::serial;

fn dev_logger() -> (Logger, CaptureSink) {
    let sink = CaptureSink::new();
    let logger = Logger::new(LoggerConfig::for_build(BuildContext::Development))
        .with_sink(Arc::new(sink.clone()))
        .with_build_context(BuildContext::Development);
    (logger, sink)
}

mod default_logger {
    use super::*;

    #[test]
    #[serial]
    fn test_set_config_is_partial() {
        let before = logging::get_config();

        logging::set_config(|c| c.min_level = LogLevel::Error);
        let after = logging::get_config();

        assert_eq!(after.min_level, LogLevel::Error);
        assert_eq!(after.enable_console, before.enable_console);
        assert_eq!(after.sanitize_data, before.sanitize_data);

        logging::replace_config(before);
    }

    #[test]
    #[serial]
    fn test_children_see_updates() {
        let before = logging::get_config();
        let child = logging::logger().child("orders");

        logging::set_config(|c| c.sanitize_data = false);
        assert!(!child.config().sanitize_data);

        logging::replace_config(before.clone());
        assert_eq!(child.config(), before);
    }

    #[test]
    #[serial]
    fn test_get_config_is_a_copy() {
        let mut copy = logging::get_config();
        copy.enable_file_logging = !copy.enable_file_logging;
        assert_ne!(logging::get_config(), copy);
    }

    #[test]
    #[serial]
    fn test_default_follows_build() {
        let before = logging::get_config();
        logging::replace_config(LoggerConfig::default());

        assert_eq!(logging::get_config(), LoggerConfig::for_build(BuildContext::current()));
        logging::replace_config(before);
    }
}

mod records {
    use super::*;

    #[test]
    fn test_line_format() {
        let (logger, sink) = dev_logger();
        logger.child("payment").info("charged", &[json!("order-7"), json!({ "amount": 5 })]);

        let record = &sink.records()[0];
        let line = record.line();
        let (timestamp, rest) = line.split_once(' ').unwrap();

        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
        assert_eq!(timestamp.len(), "2024-01-01T00:00:00.000Z".len());
        assert_eq!(rest, r#"[payment] [INFO] charged order-7 {"amount":5}"#);
    }

    #[test]
    fn test_root_without_context() {
        let (logger, sink) = dev_logger();
        logger.warn("disk almost full", &[]);
        assert!(sink.lines()[0].ends_with(" [WARN] disk almost full"));
    }

    #[test]
    fn test_validation_error_keeps_field() {
        let (logger, sink) = dev_logger();
        let err = ValidationError::new("phone must contain only digits", Some("phone".into()));
        logger.error("signup rejected", Some(&err), &[json!({ "phone": "0812-x" })]);

        let record = &sink.records()[0];
        assert_eq!(record.level, LogLevel::Error);
        assert_eq!(record.error.as_ref().unwrap()["field"], json!("phone"));
    }

    #[test]
    fn test_credential_messages_in_args() {
        let (logger, sink) = dev_logger();
        logger.debug("auth", &[json!("refresh token expired"), json!({ "refresh_token": "r1" })]);

        let record = &sink.records()[0];
        assert_eq!(record.args[0], json!("[REDACTED]"));
        assert_eq!(record.args[1], json!({ "refresh_token": "**" }));
    }
}

mod sinks {
    use super::*;

    #[derive(Default)]
    struct LevelCounter {
        counts: Mutex<[usize; 4]>,
    }

    impl LogSink for LevelCounter {
        fn emit(&self, record: &LogRecord) {
            self.counts.lock()[usize::from(record.level.rank())] += 1;
        }
    }

    #[test]
    fn test_custom_sink() {
        let counter = Arc::new(LevelCounter::default());
        let logger = Logger::new(LoggerConfig::for_build(BuildContext::Development))
            .with_sink(counter.clone())
            .with_build_context(BuildContext::Development);

        logger.debug("a", &[]);
        logger.warn("b", &[]);
        logger.warn("c", &[]);

        assert_eq!(*counter.counts.lock(), [1, 0, 2, 0]);
    }

    #[test]
    fn test_production_defaults_are_silent() {
        let sink = CaptureSink::new();
        let logger = Logger::new(LoggerConfig::for_build(BuildContext::Production))
            .with_sink(Arc::new(sink.clone()))
            .with_build_context(BuildContext::Production);

        for level in LogLevel::ALL {
            assert!(!logger.is_enabled(level));
        }
        logger.error("nobody hears this", None, &[]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_production_opt_in() {
        let sink = CaptureSink::new();
        let config = LoggerConfig {
            enable_in_production: true,
            enable_console: true,
            ..LoggerConfig::for_build(BuildContext::Production)
        };
        let logger = Logger::new(config)
            .with_sink(Arc::new(sink.clone()))
            .with_build_context(BuildContext::Production);

        logger.info("below warn", &[]);
        logger.warn("kept", &[]);
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
