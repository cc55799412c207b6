//! Cross-epoch score accumulation.
//!
//! The ledger is plain state owned by the coordinator and passed in
//! explicitly; nothing here is global.
//!
//! # Invariants
//! - `0.0 < alpha <= 1.0` (enforced in `new`)
//! - Every stored score is finite and in [0.0, 1.0] given rewards in [0.0, 1.0]

use serde::{Deserialize, Serialize};

use crate::protocol::WorkerUid;

/// Exponential moving average of per-worker incentives, indexed by uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLedger {
    alpha: f64,
    scores: Vec<f64>,
}

impl ScoreLedger {
    /// Create an empty ledger.
    ///
    /// # Errors
    /// Returns `LedgerError::InvalidAlpha` unless `0.0 < alpha <= 1.0`.
    pub fn new(alpha: f64) -> Result<Self, LedgerError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(LedgerError::InvalidAlpha(alpha));
        }
        Ok(Self {
            alpha,
            scores: Vec::new(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current score for a worker; 0.0 if it has never been scored.
    pub fn score(&self, uid: WorkerUid) -> f64 {
        self.scores.get(uid as usize).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Fold one epoch's rewards into the ledger.
    ///
    /// `score[uid] = alpha * reward + (1 - alpha) * score[uid]`
    ///
    /// # Errors
    /// Returns `LedgerError::LengthMismatch` if `uids` and `rewards` differ in
    /// length; the ledger is left untouched.
    pub fn update(&mut self, uids: &[WorkerUid], rewards: &[f64]) -> Result<(), LedgerError> {
        if uids.len() != rewards.len() {
            return Err(LedgerError::LengthMismatch {
                uids: uids.len(),
                rewards: rewards.len(),
            });
        }

        for (&uid, &reward) in uids.iter().zip(rewards) {
            let reward = if reward.is_finite() { reward } else { 0.0 };
            let index = uid as usize;
            if index >= self.scores.len() {
                self.scores.resize(index + 1, 0.0);
            }
            self.scores[index] = self.alpha * reward + (1.0 - self.alpha) * self.scores[index];
        }

        Ok(())
    }

    /// L1-normalized weights for the weight-setting step.
    ///
    /// # Postcondition
    /// Sums to 1.0, or every entry is 0.0 when no worker has any score.
    pub fn normalized_weights(&self) -> Vec<f64> {
        let total: f64 = self.scores.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.scores.len()];
        }
        self.scores.iter().map(|s| s / total).collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Moving average alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("Got {uids} worker uids but {rewards} rewards")]
    LengthMismatch { uids: usize, rewards: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_bounds() {
        assert!(ScoreLedger::new(0.0).is_err());
        assert!(ScoreLedger::new(1.5).is_err());
        assert!(ScoreLedger::new(f64::NAN).is_err());
        assert!(ScoreLedger::new(1.0).is_ok());
    }

    #[test]
    fn test_moving_average() {
        let mut ledger = ScoreLedger::new(0.5).unwrap();
        ledger.update(&[2], &[1.0]).unwrap();
        assert_eq!(ledger.score(2), 0.5);
        assert_eq!(ledger.score(0), 0.0);
        assert_eq!(ledger.scores().len(), 3);

        ledger.update(&[2], &[1.0]).unwrap();
        assert_eq!(ledger.score(2), 0.75);
    }

    #[test]
    fn test_mismatch_leaves_ledger_untouched() {
        let mut ledger = ScoreLedger::new(0.1).unwrap();
        ledger.update(&[0], &[1.0]).unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.update(&[0, 1], &[1.0]),
            Err(LedgerError::LengthMismatch { uids: 2, rewards: 1 })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_non_finite_reward_counts_as_zero() {
        let mut ledger = ScoreLedger::new(1.0).unwrap();
        ledger.update(&[0], &[f64::NAN]).unwrap();
        assert_eq!(ledger.score(0), 0.0);
    }

    #[test]
    fn test_normalized_weights() {
        let mut ledger = ScoreLedger::new(1.0).unwrap();
        assert!(ledger.normalized_weights().is_empty());

        ledger.update(&[0, 1, 3], &[0.0, 0.25, 0.75]).unwrap();
        assert_eq!(ledger.normalized_weights(), vec![0.0, 0.25, 0.0, 0.75]);

        let mut idle = ScoreLedger::new(1.0).unwrap();
        idle.update(&[0, 1], &[0.0, 0.0]).unwrap();
        assert_eq!(idle.normalized_weights(), vec![0.0, 0.0]);
    }
}
