//! The Standard Payload record produced by the standardization task.

use serde::{Deserialize, Serialize};

/// Declared fields of the Standard Payload, in reporting order.
pub const STANDARD_FIELDS: [&str; 5] = [
    "topic",
    "sentiment_score",
    "sources",
    "confidence",
    "timestamp",
];

/// Value used for `confidence` when the submitter leaves it out.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Inclusive bounds for `sentiment_score`.
pub const SENTIMENT_MIN: f64 = -1.0;
pub const SENTIMENT_MAX: f64 = 1.0;

/// Pattern `timestamp` must match exactly (after trimming).
pub const TIMESTAMP_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$";

/// A schema-perfect structured-extraction result.
///
/// Only `validate_standard_payload` constructs this from worker text, so a
/// value of this type always satisfies:
///
/// # Invariants
/// - `topic` is trimmed and non-empty
/// - `SENTIMENT_MIN <= sentiment_score <= SENTIMENT_MAX`
/// - `sources` has at least one element
/// - `timestamp` matches `TIMESTAMP_PATTERN`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardPayload {
    /// The primary subject of the trend
    pub topic: String,
    pub sentiment_score: f64,
    /// Subnet UIDs the data was drawn from
    pub sources: Vec<i64>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub timestamp: String,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}
