//! Batch reward aggregation over one objective's responses.
//!
//! # Invariants
//! - `result.len() == responses.len()`
//! - `result[i]` belongs to the worker at position `i` of the caller's identity list
//! - Every value is finite and in [0.0, 1.0]; failures resolve to `FAILED_SCORE`

use tracing::warn;

use super::quality::{ResponseScorer, ScoringError};
use crate::protocol::{ObjectiveRequest, OrchestrationResponse};

/// Per-worker scores, aligned with the caller's identity list.
pub type Rewards = Vec<f64>;

/// Score assigned to a slot whose response could not be scored.
pub const FAILED_SCORE: f64 = 0.0;

/// Score every response for `request`, preserving order.
///
/// A scorer error or a non-finite result substitutes `FAILED_SCORE` for that
/// slot only; the rest of the batch is unaffected.
///
/// # Pure Function
/// Apart from logging, no side effects.
pub fn get_rewards<S>(
    scorer: &S,
    request: &ObjectiveRequest,
    responses: &[OrchestrationResponse],
) -> Rewards
where
    S: ResponseScorer + ?Sized,
{
    responses
        .iter()
        .enumerate()
        .map(|(slot, response)| sanitize(slot, request, scorer.score(request, response)))
        .collect()
}

fn sanitize(
    slot: usize,
    request: &ObjectiveRequest,
    result: Result<f64, ScoringError>,
) -> f64 {
    match result {
        Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
        Ok(score) => {
            warn!(
                "Non-numeric score {} for slot {} of request {}; using {}",
                score,
                slot,
                request.id(),
                FAILED_SCORE
            );
            FAILED_SCORE
        }
        Err(e) => {
            warn!(
                "Scoring failed for slot {} of request {}: {}; using {}",
                slot,
                request.id(),
                e,
                FAILED_SCORE
            );
            FAILED_SCORE
        }
    }
}
