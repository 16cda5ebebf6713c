//! Sensitive-data sanitization.
//!
//! Everything that is logged or handed to an external collaborator goes
//! through here first. Sanitization never fails: shapes it does not
//! understand pass through untouched so that logging cannot break the
//! operation being logged.

use std::error::Error;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::validation::ValidationError;

/// Replacement for sensitive non-string values and flagged log strings.
pub const REDACTED: &str = "[REDACTED]";

/// Returned in place of containers nested beyond the depth bound.
pub const MAX_DEPTH_REACHED: &str = "[MAX_DEPTH_REACHED]";

/// Default recursion bound for [`sanitize_object`].
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Maximum number of stack lines kept by [`sanitize_error`].
pub const STACK_LINE_LIMIT: usize = 10;

/// Default mask character.
pub const DEFAULT_MASK: char = '*';

/// Field-name tokens that mark a key as sensitive (matched as lowercase substrings).
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "passwd",
    "token",
    "accesstoken",
    "access_token",
    "refreshtoken",
    "refresh_token",
    "authorization",
    "apikey",
    "api_key",
    "api-key",
    "secret",
    "privatekey",
    "private_key",
    "cardnumber",
    "card_number",
    "creditcard",
    "credit_card",
    "cvv",
    "ssn",
    "pin",
    "otp",
    "securitycode",
    "security_code",
];

/// Substrings that cause a whole log string to be redacted.
const LOG_STRING_TOKENS: &[&str] = &["password", "token", "secret"];

static DEFAULT_SANITIZER: Lazy<Sanitizer> = Lazy::new(Sanitizer::new);

/// Mask the middle of `text`, keeping `visible_chars` characters at each end.
///
/// The result always has the same character count as the input. When the
/// visible ends would overlap, the whole value is masked.
pub fn sanitize_value(text: &str, mask: char, visible_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len();

    if length == 0 {
        return String::new();
    }

    if visible_chars.saturating_mul(2) >= length {
        return std::iter::repeat(mask).take(length).collect();
    }

    let mut masked = String::with_capacity(text.len());
    masked.extend(&chars[..visible_chars]);
    masked.extend(std::iter::repeat(mask).take(length - visible_chars * 2));
    masked.extend(&chars[length - visible_chars..]);
    masked
}

/// Check a field name against the default sensitive token list.
pub fn is_sensitive_field(name: &str) -> bool {
    DEFAULT_SANITIZER.is_sensitive_field(name)
}

/// Recursively redact sensitive keys, descending at most `depth` levels.
pub fn sanitize_object(value: &Value, depth: usize) -> Value {
    DEFAULT_SANITIZER.sanitize_object(value, depth)
}

/// Sanitize an arbitrary payload before it is logged.
pub fn sanitize_for_log(data: &Value) -> Value {
    DEFAULT_SANITIZER.sanitize_for_log(data)
}

/// Reduce an error to a loggable `{message, name, stack}` object.
pub fn sanitize_error(error: &(dyn Error + 'static)) -> Value {
    DEFAULT_SANITIZER.sanitize_error(error)
}

/// Sensitive-data sanitizer with a configurable token list.
///
/// The token list is a substring heuristic: `oldPassword` matches `password`,
/// and so does anything else that merely contains a token.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    sensitive_fields: Vec<String>,
    mask: char,
    max_depth: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    /// Create a sanitizer with the built-in token list.
    pub fn new() -> Self {
        Self {
            sensitive_fields: SENSITIVE_FIELDS.iter().map(|token| (*token).to_string()).collect(),
            mask: DEFAULT_MASK,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Add a sensitive field token.
    pub fn add_sensitive_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into().to_lowercase();
        if !pattern.is_empty() && !self.sensitive_fields.contains(&pattern) {
            self.sensitive_fields.push(pattern);
        }
    }

    #[must_use]
    pub fn with_sensitive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.add_sensitive_pattern(pattern);
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn mask(&self) -> char {
        self.mask
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_sensitive_field(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.sensitive_fields.iter().any(|token| name_lower.contains(token.as_str()))
    }

    /// Recursively redact sensitive keys.
    ///
    /// The depth bound is the only defense against pathological nesting:
    /// once it hits zero, containers are replaced by [`MAX_DEPTH_REACHED`].
    pub fn sanitize_object(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Array(_) | Value::Object(_) if depth == 0 => {
                Value::String(MAX_DEPTH_REACHED.to_string())
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.sanitize_object(item, depth - 1)).collect())
            }
            Value::Object(map) => {
                let sanitized = map
                    .iter()
                    .map(|(key, item)| {
                        let item = if self.is_sensitive_field(key) {
                            self.redact(item)
                        } else {
                            self.sanitize_object(item, depth - 1)
                        };
                        (key.clone(), item)
                    })
                    .collect();
                Value::Object(sanitized)
            }
            scalar => scalar.clone(),
        }
    }

    /// Sanitize an arbitrary payload before it is logged.
    ///
    /// Strings mentioning a credential anywhere in their text are dropped
    /// wholesale; this is coarser than the key-based check applied to objects.
    pub fn sanitize_for_log(&self, data: &Value) -> Value {
        match data {
            Value::String(text) if Self::mentions_credential(text) => {
                Value::String(REDACTED.to_string())
            }
            Value::Array(_) | Value::Object(_) => self.sanitize_object(data, self.max_depth),
            other => other.clone(),
        }
    }

    /// Reduce an error to `{message, name, stack}`.
    ///
    /// `stack` is the source chain, one cause per line, capped at
    /// [`STACK_LINE_LIMIT`] lines.
    pub fn sanitize_error(&self, error: &(dyn Error + 'static)) -> Value {
        let stack: Vec<String> = std::iter::successors(Some(error), |&err| err.source())
            .take(STACK_LINE_LIMIT)
            .enumerate()
            .map(|(index, err)| {
                if index == 0 {
                    format!("{}: {}", error_name(err), err)
                } else {
                    format!("caused by: {}", err)
                }
            })
            .collect();

        let mut report = Map::new();
        report.insert("message".to_string(), Value::String(error.to_string()));
        report.insert("name".to_string(), Value::String(error_name(error)));
        report.insert("stack".to_string(), Value::String(stack.join("\n")));

        if let Some(field) = error.downcast_ref::<ValidationError>().and_then(|e| e.field.clone()) {
            report.insert("field".to_string(), Value::String(field));
        }

        Value::Object(report)
    }

    /// Like [`Sanitizer::sanitize_error`], merging the sanitized entries of
    /// `extra` into the report. The core keys are never overwritten.
    pub fn sanitize_error_with(&self, error: &(dyn Error + 'static), extra: &Value) -> Value {
        let mut report = self.sanitize_error(error);

        if let (Value::Object(report_map), Value::Object(_)) = (&mut report, extra) {
            if let Value::Object(sanitized) = self.sanitize_object(extra, self.max_depth) {
                for (key, value) in sanitized {
                    report_map.entry(key).or_insert(value);
                }
            }
        }

        report
    }

    fn redact(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(sanitize_value(text, self.mask, 0)),
            _ => Value::String(REDACTED.to_string()),
        }
    }

    fn mentions_credential(text: &str) -> bool {
        let lower = text.to_lowercase();
        LOG_STRING_TOKENS.iter().any(|token| lower.contains(token))
    }
}

/// Type or variant name of an error, taken from its `Debug` form.
fn error_name(error: &dyn Error) -> String {
    let debug = format!("{:?}", error);
    let name: String = debug.chars().take_while(|c| c.is_alphanumeric() || *c == '_').collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}
