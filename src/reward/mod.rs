//! Reward module - turns worker responses into bounded incentive values.
//!
//! # Key Concepts
//! - Quality: Reasoning / Fidelity / Utility gates for a single response
//! - Batch: order-preserving scoring of one objective's responses
//! - Combined: routing score merged with the standardization score
//! - Ledger: coordinator-owned moving average across epochs
//!
//! Everything except the ledger is a pure function of its inputs.

mod batch;
mod combined;
mod ledger;
mod quality;

pub use batch::{get_rewards, Rewards, FAILED_SCORE};
pub use combined::{calculate_combined_score, IncentiveWeights, WeightsError, WEIGHT_SUM_TOLERANCE};
pub use ledger::{LedgerError, ScoreLedger};
pub use quality::{
    PresenceOnly, ProofVerifier, QualityScorer, ResponseScorer, ScoringError, SubScores, WellFormed,
    FIDELITY_WEIGHT, MIN_COMPLETION_CHARS, MIN_REASONING_CHARS, REASONING_WEIGHT, UTILITY_WEIGHT,
};
