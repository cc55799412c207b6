//! Schema module - the standardization mechanism.
//!
//! Workers submit a structured-extraction result as raw text. The validator
//! classifies it as schema-perfect or rejects it with itemized field errors;
//! the result feeds the standardization score as a binary 1.0/0.0 signal.
//!
//! The closed-world check is explicit (declared field set, then per-field
//! rules) rather than delegated to serde, so every violation is collected and
//! reported together.

mod payload;
mod validator;

pub use payload::{
    StandardPayload, DEFAULT_CONFIDENCE, SENTIMENT_MAX, SENTIMENT_MIN, STANDARD_FIELDS,
    TIMESTAMP_PATTERN,
};
pub use validator::{
    standardization_score, validate_standard_payload, FieldError, ValidationFailure,
    ValidationOutcome, ROOT_PATH,
};
