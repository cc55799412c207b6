//! Combined incentive: routing/synthesis quality merged with standardization.
//!
//! # Invariants
//! - `IncentiveWeights` holds exactly two finite, non-negative weights summing to 1.0
//! - A malformed vector is rejected when the weights are built, never per call

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights for the two mechanisms: `[routing, standardization]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncentiveWeights {
    routing: f64,
    standardization: f64,
}

impl IncentiveWeights {
    /// Build a validated weight pair.
    ///
    /// # Errors
    /// Returns `WeightsError` if a weight is negative or non-finite, or if
    /// the pair does not sum to 1.0.
    pub fn new(routing: f64, standardization: f64) -> Result<Self, WeightsError> {
        for (index, weight) in [routing, standardization].into_iter().enumerate() {
            if !weight.is_finite() {
                return Err(WeightsError::NotFinite { index });
            }
            if weight < 0.0 {
                return Err(WeightsError::Negative { index, weight });
            }
        }

        let sum = routing + standardization;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum { sum });
        }

        Ok(Self {
            routing,
            standardization,
        })
    }

    /// Build from an arbitrary-length vector (e.g. parsed configuration).
    pub fn from_slice(weights: &[f64]) -> Result<Self, WeightsError> {
        match weights {
            [routing, standardization] => Self::new(*routing, *standardization),
            _ => Err(WeightsError::WrongArity {
                len: weights.len(),
            }),
        }
    }

    pub fn routing(&self) -> f64 {
        self.routing
    }

    pub fn standardization(&self) -> f64 {
        self.standardization
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.routing, self.standardization]
    }
}

impl Default for IncentiveWeights {
    /// 70% routing & synthesis, 30% data standardization.
    fn default() -> Self {
        Self {
            routing: 0.7,
            standardization: 0.3,
        }
    }
}

impl TryFrom<Vec<f64>> for IncentiveWeights {
    type Error = WeightsError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&weights)
    }
}

// Serialized as `[routing, standardization]`, the same shape accepted on input.
impl Serialize for IncentiveWeights {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IncentiveWeights {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let weights = Vec::<f64>::deserialize(deserializer)?;
        Self::from_slice(&weights).map_err(serde::de::Error::custom)
    }
}

/// Final per-epoch incentive for one worker.
///
/// `routing * w_routing + standardization * w_standardization`
///
/// # Pure Function
/// No side effects and no failure modes; the weights were validated when built.
pub fn calculate_combined_score(
    routing_score: f64,
    standardization_score: f64,
    weights: &IncentiveWeights,
) -> f64 {
    routing_score * weights.routing + standardization_score * weights.standardization
}

/// Configuration errors for the incentive weight vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("Expected exactly 2 incentive weights, got {len}")]
    WrongArity { len: usize },

    #[error("Incentive weight {index} is negative ({weight})")]
    Negative { index: usize, weight: f64 },

    #[error("Incentive weight {index} is not a finite number")]
    NotFinite { index: usize },

    #[error("Incentive weights must sum to 1.0, got {sum}")]
    BadSum { sum: f64 },
}
