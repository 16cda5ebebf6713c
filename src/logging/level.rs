//! Log severity levels.

use serde::{Deserialize, Serialize};

/// Severity of a log call, ordered `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Upper-case label used in formatted log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Numeric rank (0-3).
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::ALL.iter().map(|l| l.rank()).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" info ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!("trace".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_serde() {
        #[derive(Deserialize)]
        struct Section {
            level: LogLevel,
        }

        let section: Section = toml::from_str("level = \"error\"").unwrap();
        assert_eq!(section.level, LogLevel::Error);
        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"info\"");
    }
}
