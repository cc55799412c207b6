//! Strict, closed-world validation of Standard Payload submissions.
//!
//! # Algorithm
//! 1. Parse the raw text as JSON. Failure is one coarse `NotParseable` error.
//! 2. Evaluate every field rule and collect all violations (no short-circuit).
//! 3. Reject every key that is not a declared field.
//!
//! A submission passes only if no rule fires. There is no partial credit.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::payload::{
    StandardPayload, DEFAULT_CONFIDENCE, SENTIMENT_MAX, SENTIMENT_MIN, STANDARD_FIELDS,
    TIMESTAMP_PATTERN,
};

/// Path reported when the top-level value is not an object.
pub const ROOT_PATH: &str = "(root)";

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern is a valid regex"));

/// Result of validating one submission.
pub type ValidationOutcome = Result<StandardPayload, ValidationFailure>;

/// A single violated rule.
///
/// `field` uses dotted notation for nested locations (`sources.2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}': {}", self.field, self.message)
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    /// The text is not JSON at all; no field detail exists yet.
    #[error("Output is not a valid JSON string: {reason}")]
    NotParseable { reason: String },

    /// The text is JSON but breaks one or more schema rules.
    #[error("Schema validation failed with {} error(s)", .0.len())]
    Schema(Vec<FieldError>),
}

impl ValidationFailure {
    /// Itemized field errors, in reporting order. Empty for `NotParseable`.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::NotParseable { .. } => &[],
            Self::Schema(errors) => errors,
        }
    }

    /// Human-readable report suitable for showing to the submitter.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        for error in self.field_errors() {
            out.push_str("\n  - ");
            out.push_str(&error.to_string());
        }
        out
    }
}

/// Validate raw worker text against the Standard Payload contract.
///
/// # Returns
/// - `Ok(payload)` if the submission is schema-perfect; text fields are trimmed
/// - `Err(ValidationFailure)` otherwise, with every violation collected
///
/// # Pure Function
/// No hidden state: identical input yields identical output.
pub fn validate_standard_payload(raw: &str) -> ValidationOutcome {
    let value: Value = serde_json::from_str(raw).map_err(|e| ValidationFailure::NotParseable {
        reason: e.to_string(),
    })?;

    let Some(fields) = value.as_object() else {
        return Err(ValidationFailure::Schema(vec![FieldError::new(
            ROOT_PATH,
            "Input should be a valid object",
        )]));
    };

    let mut errors = Vec::new();

    let topic = check_topic(fields, &mut errors);
    let sentiment_score = check_sentiment(fields, &mut errors);
    let sources = check_sources(fields, &mut errors);
    let confidence = check_confidence(fields, &mut errors);
    let timestamp = check_timestamp(fields, &mut errors);

    // Closed world: anything undeclared invalidates the whole payload.
    for key in fields.keys() {
        if !STANDARD_FIELDS.contains(&key.as_str()) {
            errors.push(FieldError::new(key.as_str(), "Extra inputs are not permitted"));
        }
    }

    match (topic, sentiment_score, sources, confidence, timestamp) {
        (Some(topic), Some(sentiment_score), Some(sources), Some(confidence), Some(timestamp))
            if errors.is_empty() =>
        {
            Ok(StandardPayload {
                topic,
                sentiment_score,
                sources,
                confidence,
                timestamp,
            })
        }
        _ => {
            tracing::debug!("Standard payload rejected with {} error(s)", errors.len());
            Err(ValidationFailure::Schema(errors))
        }
    }
}

/// Binary standardization signal: 1.0 for schema-perfect, 0.0 otherwise.
pub fn standardization_score(raw: &str) -> f64 {
    if validate_standard_payload(raw).is_ok() {
        1.0
    } else {
        0.0
    }
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Value> {
    let value = fields.get(name);
    if value.is_none() {
        errors.push(FieldError::new(name, "Field required"));
    }
    value
}

fn check_topic(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match required(fields, "topic", errors)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.push(FieldError::new(
                    "topic",
                    "String should have at least 1 character",
                ));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => {
            errors.push(FieldError::new("topic", "Input should be a valid string"));
            None
        }
    }
}

fn check_sentiment(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<f64> {
    let value = required(fields, "sentiment_score", errors)?;
    let Some(score) = value.as_f64() else {
        errors.push(FieldError::new(
            "sentiment_score",
            "Input should be a valid number",
        ));
        return None;
    };

    if score < SENTIMENT_MIN {
        errors.push(FieldError::new(
            "sentiment_score",
            format!("Input should be greater than or equal to {}", SENTIMENT_MIN),
        ));
        None
    } else if score > SENTIMENT_MAX {
        errors.push(FieldError::new(
            "sentiment_score",
            format!("Input should be less than or equal to {}", SENTIMENT_MAX),
        ));
        None
    } else {
        Some(score)
    }
}

fn check_sources(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Vec<i64>> {
    let Value::Array(items) = required(fields, "sources", errors)? else {
        errors.push(FieldError::new("sources", "Input should be a valid list"));
        return None;
    };

    let before = errors.len();
    let mut sources = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_i64() {
            Some(uid) => sources.push(uid),
            None => errors.push(FieldError::new(
                format!("sources.{}", index),
                "Input should be a valid integer",
            )),
        }
    }

    if items.is_empty() {
        errors.push(FieldError::new(
            "sources",
            "List should have at least 1 item after validation, not 0",
        ));
        return None;
    }

    (errors.len() == before).then_some(sources)
}

fn check_confidence(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<f64> {
    match fields.get("confidence") {
        None | Some(Value::Null) => Some(DEFAULT_CONFIDENCE),
        Some(value) => match value.as_f64() {
            Some(confidence) => Some(confidence),
            None => {
                errors.push(FieldError::new("confidence", "Input should be a valid number"));
                None
            }
        },
    }
}

fn check_timestamp(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Value::String(s) = required(fields, "timestamp", errors)? else {
        errors.push(FieldError::new("timestamp", "Input should be a valid string"));
        return None;
    };

    let trimmed = s.trim();
    if TIMESTAMP_RE.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        errors.push(FieldError::new(
            "timestamp",
            format!("String should match pattern '{}'", TIMESTAMP_PATTERN),
        ));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GOOD: &str = r#"{"topic":" Decentralized Compute ","sentiment_score":0.85,"sources":[1,13],"timestamp":"2026-02-06T12:00:00Z"}"#;
    const BAD: &str = r#"{"topic":"AI","sentiment_score":5.0,"sources":[],"timestamp":"Friday 12pm"}"#;

    fn fields_of(raw: &str) -> Vec<String> {
        validate_standard_payload(raw)
            .unwrap_err()
            .field_errors()
            .iter()
            .map(|e| e.field.clone())
            .collect()
    }

    fn base() -> serde_json::Value {
        json!({
            "topic": "AI",
            "sentiment_score": 0.1,
            "sources": [1],
            "timestamp": "2026-02-06T12:00:00Z",
        })
    }

    #[test]
    fn test_schema_perfect_payload_is_trimmed() {
        let payload = validate_standard_payload(GOOD).unwrap();
        assert_eq!(payload.topic, "Decentralized Compute");
        assert_eq!(payload.sentiment_score, 0.85);
        assert_eq!(payload.sources, vec![1, 13]);
        assert_eq!(payload.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(payload.timestamp, "2026-02-06T12:00:00Z");
        assert_eq!(standardization_score(GOOD), 1.0);
    }

    #[test]
    fn test_failing_payload_reports_three_errors() {
        assert_eq!(
            fields_of(BAD),
            vec!["sentiment_score", "sources", "timestamp"]
        );
        assert_eq!(standardization_score(BAD), 0.0);
    }

    #[test]
    fn test_not_parseable_is_single_coarse_error() {
        let failure = validate_standard_payload("{topic: AI").unwrap_err();
        assert!(matches!(failure, ValidationFailure::NotParseable { .. }));
        assert!(failure.field_errors().is_empty());
        assert!(failure.report().starts_with("Output is not a valid JSON string"));
    }

    #[test]
    fn test_non_object_is_rejected_at_root() {
        assert_eq!(fields_of("[1, 2, 3]"), vec![ROOT_PATH]);
    }

    #[test]
    fn test_extra_field_is_rejected() {
        let mut value = base();
        value["mood"] = json!("sunny");
        let errors = fields_of(&value.to_string());
        assert_eq!(errors, vec!["mood"]);

        let failure = validate_standard_payload(&value.to_string()).unwrap_err();
        assert_eq!(
            failure.field_errors()[0].message,
            "Extra inputs are not permitted"
        );
    }

    #[test]
    fn test_sentiment_out_of_range_always_reported() {
        for score in [-1.5, 1.0001, 42.0] {
            let mut value = base();
            value["sentiment_score"] = json!(score);
            // Other fields broken too; range error must still appear.
            value["sources"] = json!([]);
            assert!(fields_of(&value.to_string()).contains(&"sentiment_score".to_string()));
        }
    }

    #[test]
    fn test_sentiment_bounds_are_inclusive() {
        for score in [json!(-1.0), json!(1.0), json!(0)] {
            let mut value = base();
            value["sentiment_score"] = score;
            assert!(validate_standard_payload(&value.to_string()).is_ok());
        }
    }

    #[test]
    fn test_sources_min_length() {
        let mut value = base();
        value["sources"] = json!([]);
        assert_eq!(fields_of(&value.to_string()), vec!["sources"]);

        value["sources"] = json!([7]);
        assert!(validate_standard_payload(&value.to_string()).is_ok());
    }

    #[test]
    fn test_sources_element_paths_are_dotted() {
        let mut value = base();
        value["sources"] = json!([1, "two", 3.5]);
        assert_eq!(fields_of(&value.to_string()), vec!["sources.1", "sources.2"]);
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = validate_standard_payload("{}").unwrap_err();
        let fields: Vec<_> = errors.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["topic", "sentiment_score", "sources", "timestamp"]);
        assert!(errors.field_errors().iter().all(|e| e.message == "Field required"));
    }

    #[test]
    fn test_confidence_defaults_and_types() {
        let mut value = base();
        value["confidence"] = json!(0.9);
        assert_eq!(
            validate_standard_payload(&value.to_string()).unwrap().confidence,
            0.9
        );

        value["confidence"] = json!(null);
        assert_eq!(
            validate_standard_payload(&value.to_string()).unwrap().confidence,
            DEFAULT_CONFIDENCE
        );

        value["confidence"] = json!("high");
        assert_eq!(fields_of(&value.to_string()), vec!["confidence"]);
    }

    #[test]
    fn test_whitespace_trimmed_before_validation() {
        let mut value = base();
        value["topic"] = json!(" AI ");
        value["timestamp"] = json!(" 2026-02-06T12:00:00Z ");
        let payload = validate_standard_payload(&value.to_string()).unwrap();
        assert_eq!(payload.topic, "AI");
        assert_eq!(payload.timestamp, "2026-02-06T12:00:00Z");

        value["topic"] = json!("   ");
        assert_eq!(fields_of(&value.to_string()), vec!["topic"]);
    }

    #[test]
    fn test_timestamp_pattern_is_exact() {
        for ts in ["2026-02-06 12:00:00Z", "2026-02-06T12:00:00", "2026-02-06T12:00:00.000Z"] {
            let mut value = base();
            value["timestamp"] = json!(ts);
            assert_eq!(fields_of(&value.to_string()), vec!["timestamp"]);
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        assert_eq!(validate_standard_payload(GOOD), validate_standard_payload(GOOD));
        assert_eq!(validate_standard_payload(BAD), validate_standard_payload(BAD));
    }

    #[test]
    fn test_report_lists_every_field() {
        let report = validate_standard_payload(BAD).unwrap_err().report();
        assert!(report.contains("Field 'sentiment_score'"));
        assert!(report.contains("Field 'sources'"));
        assert!(report.contains("Field 'timestamp'"));
    }
}
