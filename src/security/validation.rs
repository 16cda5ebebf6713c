//! Input validation primitives.
//!
//! Each primitive checks one untyped value against a rule and hands back a
//! [`ValidationResult`] instead of failing hard. Callers decide what to do with
//! a failure: inspect it, combine it with [`validate_multiple`], or elevate it
//! into a propagatable [`ValidationError`] with [`ensure_valid`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Field name used when the caller does not supply one.
pub const DEFAULT_FIELD: &str = "value";

/// Upper bound applied to emails and identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Default phone number length bounds (digits only).
pub const PHONE_MIN_LENGTH: usize = 8;
pub const PHONE_MAX_LENGTH: usize = 15;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static UUID_V4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid pattern is valid")
});

/// Details of a failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Human-readable message
    pub message: String,

    /// Field the failure is attributed to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Outcome of a single validation primitive.
///
/// A `Valid` result never carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationFailure),
}

impl ValidationResult {
    /// Create a successful result.
    pub fn ok() -> Self {
        Self::Valid
    }

    /// Create a failed result attributed to `field`.
    pub fn fail(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid(ValidationFailure { message: message.into(), field: Some(field.into()) })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(failure) => Some(&failure.message),
        }
    }

    /// The field the failure is attributed to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(failure) => failure.field.as_deref(),
        }
    }

    /// Elevate this result into a `Result`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(failure) => Err(failure.into()),
        }
    }
}

/// A validation failure raised at a caller-chosen boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, field: Option<String>) -> Self {
        Self { message: message.into(), field }
    }
}

impl From<ValidationFailure> for ValidationError {
    fn from(failure: ValidationFailure) -> Self {
        Self { message: failure.message, field: failure.field }
    }
}

/// Kind of identifier accepted by [`validate_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdKind {
    /// Any non-empty string up to the identifier length limit.
    #[default]
    Any,
    /// Version 4 UUID in hyphenated form.
    Uuid,
    /// Decimal digits only.
    Numeric,
}

impl std::str::FromStr for IdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "uuid" => Ok(Self::Uuid),
            "numeric" => Ok(Self::Numeric),
            other => Err(format!("unknown id kind '{}'", other)),
        }
    }
}

fn field_or_default(field: Option<&str>, default: &str) -> String {
    field.unwrap_or(default).to_string()
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Check that `value` is a string whose trimmed length lies within bounds.
///
/// Trimming only affects the length check; nothing is rewritten.
pub fn validate_string(
    value: &Value,
    field: Option<&str>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    allow_empty: bool,
) -> ValidationResult {
    let field = field_or_default(field, DEFAULT_FIELD);

    let text = match value {
        Value::Null => return ValidationResult::fail(&field, format!("{} is required", field)),
        Value::String(text) => text,
        _ => return ValidationResult::fail(&field, format!("{} must be a string", field)),
    };

    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length == 0 && !allow_empty {
        return ValidationResult::fail(&field, format!("{} cannot be empty", field));
    }

    if let Some(min) = min_length {
        if length < min {
            return ValidationResult::fail(
                &field,
                format!("{} must be at least {} characters", field, min),
            );
        }
    }

    if let Some(max) = max_length {
        if length > max {
            return ValidationResult::fail(
                &field,
                format!("{} must be at most {} characters", field, max),
            );
        }
    }

    ValidationResult::ok()
}

/// Check that `value` looks like `local@domain.tld`.
pub fn validate_email(value: &Value, field: Option<&str>) -> ValidationResult {
    let field = field_or_default(field, "email");

    let result = validate_string(value, Some(&field), Some(1), Some(MAX_IDENTIFIER_LENGTH), false);
    if !result.is_valid() {
        return result;
    }

    let email = value.as_str().unwrap_or_default().trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return ValidationResult::fail(&field, format!("{} must be a valid email address", field));
    }

    ValidationResult::ok()
}

/// Check that `value` is a digits-only phone number within length bounds.
pub fn validate_phone(
    value: &Value,
    field: Option<&str>,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> ValidationResult {
    let field = field_or_default(field, "phone");
    let min = min_length.unwrap_or(PHONE_MIN_LENGTH);
    let max = max_length.unwrap_or(PHONE_MAX_LENGTH);

    let result = validate_string(value, Some(&field), Some(min), Some(max), false);
    if !result.is_valid() {
        return result;
    }

    let phone = value.as_str().unwrap_or_default().trim();
    if !is_all_digits(phone) {
        return ValidationResult::fail(&field, format!("{} must contain only digits", field));
    }

    ValidationResult::ok()
}

/// Check that `value` is an identifier of the given kind.
pub fn validate_id(value: &Value, field: Option<&str>, kind: IdKind) -> ValidationResult {
    let field = field_or_default(field, "id");

    let result = validate_string(value, Some(&field), Some(1), Some(MAX_IDENTIFIER_LENGTH), false);
    if !result.is_valid() {
        return result;
    }

    let id = value.as_str().unwrap_or_default().trim();
    match kind {
        IdKind::Any => ValidationResult::ok(),
        IdKind::Uuid if UUID_V4_PATTERN.is_match(&id.to_lowercase()) => ValidationResult::ok(),
        IdKind::Uuid => ValidationResult::fail(&field, format!("{} must be a valid UUID", field)),
        IdKind::Numeric if is_all_digits(id) => ValidationResult::ok(),
        IdKind::Numeric => ValidationResult::fail(&field, format!("{} must be numeric", field)),
    }
}

/// Check that `value` is present and not empty.
pub fn validate_required(value: &Value, field: Option<&str>) -> ValidationResult {
    let field = field_or_default(field, DEFAULT_FIELD);

    let missing = match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };

    if missing {
        return ValidationResult::fail(&field, format!("{} is required", field));
    }

    ValidationResult::ok()
}

/// Return the first failing result in order, or success.
pub fn validate_multiple(results: impl IntoIterator<Item = ValidationResult>) -> ValidationResult {
    results.into_iter().find(|result| !result.is_valid()).unwrap_or(ValidationResult::Valid)
}

/// Convert a failed result into a [`ValidationError`]; success is a no-op.
pub fn ensure_valid(result: &ValidationResult) -> Result<(), ValidationError> {
    result.clone().into_result()
}
