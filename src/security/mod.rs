//! Validation and sanitization primitives for Member Base.
//!
//! Two separate concerns live here:
//! - **Validation**: single-value checks that return a [`ValidationResult`]
//!   rather than failing, plus [`ensure_valid`] for callers that want to abort
//!   on the first bad input.
//! - **Sanitization**: recursive masking and redaction of sensitive data before
//!   it is logged or persisted by a collaborator.
//!
//! # Error reporting
//!
//! Results are data until a caller decides otherwise. Services that need
//! fail-fast behavior call [`ensure_valid`] at their boundary and propagate the
//! resulting [`ValidationError`] with `?`.

mod sanitization;
mod validation;

pub use sanitization::{
    is_sensitive_field, sanitize_error, sanitize_for_log, sanitize_object, sanitize_value,
    Sanitizer, DEFAULT_MASK, DEFAULT_MAX_DEPTH, MAX_DEPTH_REACHED, REDACTED, SENSITIVE_FIELDS,
    STACK_LINE_LIMIT,
};
pub use validation::{
    ensure_valid, validate_email, validate_id, validate_multiple, validate_phone,
    validate_required, validate_string, IdKind, ValidationError, ValidationFailure,
    ValidationResult, DEFAULT_FIELD, MAX_IDENTIFIER_LENGTH, PHONE_MAX_LENGTH, PHONE_MIN_LENGTH,
};
