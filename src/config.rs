//! Configuration management for the coordinator.
//!
//! Configuration can be set via environment variables:
//! - `ORCHESTRA_INCENTIVE_WEIGHTS` - Optional. `routing,standardization` weights. Defaults to `0.7,0.3`.
//! - `ORCHESTRA_SAMPLE_SIZE` - Optional. Workers queried per epoch. Defaults to `10`.
//! - `ORCHESTRA_QUERY_TIMEOUT_SECS` - Optional. Per-worker response timeout. Defaults to `12`.
//! - `ORCHESTRA_MOVING_AVERAGE_ALPHA` - Optional. Score ledger smoothing factor in (0, 1]. Defaults to `0.1`.
//! - `ORCHESTRA_STANDARDIZATION` - Optional. Dispatch the standardization task each epoch. Defaults to `true`.
//! - `ORCHESTRA_STRICT_PROOFS` - Optional. Only credit Fidelity for well-formed pipeline steps. Defaults to `false`.
//!
//! A malformed weight vector is fatal here, before any response is scored.

use std::time::Duration;

use thiserror::Error;

use crate::reward::{IncentiveWeights, WeightsError};
use crate::util::{env_var_bool, env_var_parse, parse_float_list};

pub const DEFAULT_SAMPLE_SIZE: usize = 10;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_MOVING_AVERAGE_ALPHA: f64 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Invalid incentive weights: {0}")]
    Weights(#[from] WeightsError),
}

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Routing vs. standardization weights (validated)
    pub weights: IncentiveWeights,

    /// Maximum number of workers queried per epoch
    pub sample_size: usize,

    /// How long to wait for each worker before scoring it as empty
    pub query_timeout: Duration,

    /// Smoothing factor for the cross-epoch score ledger
    pub moving_average_alpha: f64,

    /// Whether the standardization task runs alongside routing
    pub standardization_enabled: bool,

    /// Require every pipeline step to carry step, subnet and proof
    pub strict_proofs: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Weights` for a malformed weight vector and
    /// `ConfigError::InvalidValue` for any other unparseable or out-of-range value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let weights = match std::env::var("ORCHESTRA_INCENTIVE_WEIGHTS") {
            Ok(raw) => {
                let values = parse_float_list(&raw).map_err(|e| {
                    ConfigError::InvalidValue("ORCHESTRA_INCENTIVE_WEIGHTS".to_string(), e.to_string())
                })?;
                IncentiveWeights::from_slice(&values)?
            }
            Err(_) => IncentiveWeights::default(),
        };

        let sample_size = env_var_parse("ORCHESTRA_SAMPLE_SIZE", DEFAULT_SAMPLE_SIZE)
            .map_err(|(name, why)| ConfigError::InvalidValue(name, why))?;
        if sample_size == 0 {
            return Err(ConfigError::InvalidValue(
                "ORCHESTRA_SAMPLE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let timeout_secs = env_var_parse(
            "ORCHESTRA_QUERY_TIMEOUT_SECS",
            DEFAULT_QUERY_TIMEOUT.as_secs_f64(),
        )
        .map_err(|(name, why)| ConfigError::InvalidValue(name, why))?;
        let query_timeout = Duration::try_from_secs_f64(timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "ORCHESTRA_QUERY_TIMEOUT_SECS".to_string(),
                    format!("must be a positive number of seconds, got {}", timeout_secs),
                )
            })?;

        let moving_average_alpha =
            env_var_parse("ORCHESTRA_MOVING_AVERAGE_ALPHA", DEFAULT_MOVING_AVERAGE_ALPHA)
                .map_err(|(name, why)| ConfigError::InvalidValue(name, why))?;
        if !(moving_average_alpha > 0.0 && moving_average_alpha <= 1.0) {
            return Err(ConfigError::InvalidValue(
                "ORCHESTRA_MOVING_AVERAGE_ALPHA".to_string(),
                format!("must be in (0, 1], got {}", moving_average_alpha),
            ));
        }

        Ok(Self {
            weights,
            sample_size,
            query_timeout,
            moving_average_alpha,
            standardization_enabled: env_var_bool("ORCHESTRA_STANDARDIZATION", true),
            strict_proofs: env_var_bool("ORCHESTRA_STRICT_PROOFS", false),
        })
    }

    /// Create a config with the given weights and defaults elsewhere
    /// (useful for testing).
    pub fn new(weights: IncentiveWeights) -> Self {
        Self {
            weights,
            sample_size: DEFAULT_SAMPLE_SIZE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            moving_average_alpha: DEFAULT_MOVING_AVERAGE_ALPHA,
            standardization_enabled: true,
            strict_proofs: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(IncentiveWeights::default())
    }
}
