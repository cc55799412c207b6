//! Response quality scoring.
//!
//! # Formula
//! `score = 0.4 * Reasoning + 0.3 * Fidelity + 0.3 * Utility`
//!
//! Each sub-score is a binary gate (0.0 or 1.0):
//! - Fidelity: `task_pipeline` present, non-empty, and every step accepted by the `ProofVerifier`
//! - Reasoning: `reasoning_path` longer than `MIN_REASONING_CHARS`
//! - Utility: `final_completion` longer than `MIN_COMPLETION_CHARS`
//!
//! A missing field fails its gate; it is never an error.

use crate::protocol::{ObjectiveRequest, OrchestrationResponse, PipelineStep};

pub const REASONING_WEIGHT: f64 = 0.4;
pub const FIDELITY_WEIGHT: f64 = 0.3;
pub const UTILITY_WEIGHT: f64 = 0.3;

/// `reasoning_path` must be strictly longer than this (in characters).
pub const MIN_REASONING_CHARS: usize = 50;

/// `final_completion` must be strictly longer than this (in characters).
pub const MIN_COMPLETION_CHARS: usize = 100;

/// The three independent gates for one response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub reasoning: f64,
    pub fidelity: f64,
    pub utility: f64,
}

impl SubScores {
    /// Weighted sum in [0.0, 1.0].
    pub fn weighted(&self) -> f64 {
        REASONING_WEIGHT * self.reasoning
            + FIDELITY_WEIGHT * self.fidelity
            + UTILITY_WEIGHT * self.utility
    }
}

/// Checks that a pipeline step's proof refers to a real external computation.
///
/// This is the extension point for hardening Fidelity. `PresenceOnly`
/// accepts every step, which makes Fidelity a presence check: one dummy
/// pipeline entry is enough for full credit until a ledger-backed
/// verifier is plugged in.
///
/// Implementations must not panic: a failed check is `Ok(false)` and an
/// unavailable backend is `Err`. Panics are not caught by the batch
/// aggregator and abort the whole batch.
pub trait ProofVerifier: Send + Sync {
    /// # Returns
    /// `Ok(true)` if the proof checks out, `Ok(false)` if it does not,
    /// `Err` if verification could not be carried out.
    fn verify(&self, step: &PipelineStep) -> Result<bool, ScoringError>;
}

/// Accepts every recorded step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceOnly;

impl ProofVerifier for PresenceOnly {
    fn verify(&self, _step: &PipelineStep) -> Result<bool, ScoringError> {
        Ok(true)
    }
}

/// Accepts a step only if it names its position, a subnet and a non-empty proof.
///
/// Still says nothing about whether the proof is authentic.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellFormed;

impl ProofVerifier for WellFormed {
    fn verify(&self, step: &PipelineStep) -> Result<bool, ScoringError> {
        let has_proof = step.proof().is_some_and(|p| !p.trim().is_empty());
        Ok(step.step().is_some() && step.subnet().is_some() && has_proof)
    }
}

/// Anything that turns one worker response into an incentive value.
///
/// Report failure as `Err(ScoringError)`, never by panicking; the batch
/// aggregator only recovers from `Err` and non-finite values.
pub trait ResponseScorer: Send + Sync {
    /// Score a response to `request`.
    ///
    /// # Postcondition
    /// On `Ok`, the value is intended to lie in [0.0, 1.0]; the batch
    /// aggregator still guards against anything else.
    fn score(
        &self,
        request: &ObjectiveRequest,
        response: &OrchestrationResponse,
    ) -> Result<f64, ScoringError>;
}

/// The Reasoning / Fidelity / Utility scorer.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer<V = PresenceOnly> {
    verifier: V,
}

impl QualityScorer {
    /// Scorer with presence-only fidelity.
    pub fn new() -> Self {
        Self {
            verifier: PresenceOnly,
        }
    }
}

impl<V: ProofVerifier> QualityScorer<V> {
    /// Scorer that checks every pipeline proof with `verifier`.
    pub fn with_verifier(verifier: V) -> Self {
        Self { verifier }
    }

    /// Compute the three gates for a response.
    ///
    /// # Errors
    /// Only if the proof verifier fails; missing fields never error.
    pub fn sub_scores(&self, response: &OrchestrationResponse) -> Result<SubScores, ScoringError> {
        Ok(SubScores {
            reasoning: gate(longer_than(
                response.reasoning_path.as_deref(),
                MIN_REASONING_CHARS,
            )),
            fidelity: gate(self.pipeline_is_faithful(response)?),
            utility: gate(longer_than(
                response.final_completion.as_deref(),
                MIN_COMPLETION_CHARS,
            )),
        })
    }

    fn pipeline_is_faithful(&self, response: &OrchestrationResponse) -> Result<bool, ScoringError> {
        let steps = response.pipeline();
        if steps.is_empty() {
            return Ok(false);
        }
        for step in steps {
            if !self.verifier.verify(step)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<V: ProofVerifier> ResponseScorer for QualityScorer<V> {
    fn score(
        &self,
        _request: &ObjectiveRequest,
        response: &OrchestrationResponse,
    ) -> Result<f64, ScoringError> {
        Ok(self.sub_scores(response)?.weighted())
    }
}

fn longer_than(text: Option<&str>, min_chars: usize) -> bool {
    text.is_some_and(|t| t.chars().count() > min_chars)
}

fn gate(passed: bool) -> f64 {
    if passed {
        1.0
    } else {
        0.0
    }
}

/// Failure inside a scorer. Never escapes the batch aggregator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("Proof verification unavailable: {0}")]
    VerifierUnavailable(String),

    #[error("Internal scoring error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SubnetId;

    const EPS: f64 = 1e-9;

    fn request() -> ObjectiveRequest {
        ObjectiveRequest::new("Create a Python scraper for news and summarize trends.").unwrap()
    }

    fn full_response() -> OrchestrationResponse {
        OrchestrationResponse::empty()
            .with_pipeline(vec![PipelineStep::new(1, SubnetId(62), "0xabc")])
            .with_reasoning("r".repeat(51))
            .with_completion("u".repeat(101))
    }

    struct RejectAll;

    impl ProofVerifier for RejectAll {
        fn verify(&self, _step: &PipelineStep) -> Result<bool, ScoringError> {
            Ok(false)
        }
    }

    struct Offline;

    impl ProofVerifier for Offline {
        fn verify(&self, _step: &PipelineStep) -> Result<bool, ScoringError> {
            Err(ScoringError::VerifierUnavailable("ledger offline".to_string()))
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((REASONING_WEIGHT + FIDELITY_WEIGHT + UTILITY_WEIGHT - 1.0).abs() < EPS);
    }

    #[test]
    fn test_full_response_scores_one() {
        let score = QualityScorer::new().score(&request(), &full_response()).unwrap();
        assert!((score - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_response_scores_zero() {
        let score = QualityScorer::new()
            .score(&request(), &OrchestrationResponse::empty())
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_each_gate_contributes_its_weight() {
        let scorer = QualityScorer::new();

        let only_reasoning = OrchestrationResponse::empty().with_reasoning("r".repeat(60));
        let only_fidelity = OrchestrationResponse::empty()
            .with_pipeline(vec![PipelineStep::new(1, SubnetId(13), "0x1")]);
        let only_utility = OrchestrationResponse::empty().with_completion("u".repeat(200));

        assert!((scorer.score(&request(), &only_reasoning).unwrap() - 0.4).abs() < EPS);
        assert!((scorer.score(&request(), &only_fidelity).unwrap() - 0.3).abs() < EPS);
        assert!((scorer.score(&request(), &only_utility).unwrap() - 0.3).abs() < EPS);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let scorer = QualityScorer::new();
        let at_threshold = OrchestrationResponse::empty()
            .with_reasoning("r".repeat(MIN_REASONING_CHARS))
            .with_completion("u".repeat(MIN_COMPLETION_CHARS));
        let subs = scorer.sub_scores(&at_threshold).unwrap();
        assert_eq!(subs.reasoning, 0.0);
        assert_eq!(subs.utility, 0.0);
    }

    #[test]
    fn test_utility_flips_only_utility() {
        let scorer = QualityScorer::new();
        let base = full_response().with_completion("u".repeat(99));
        let longer = full_response().with_completion("u".repeat(101));

        let before = scorer.sub_scores(&base).unwrap();
        let after = scorer.sub_scores(&longer).unwrap();

        assert_eq!(before.utility, 0.0);
        assert_eq!(after.utility, 1.0);
        assert_eq!(before.reasoning, after.reasoning);
        assert_eq!(before.fidelity, after.fidelity);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 51 two-byte characters.
        let response = OrchestrationResponse::empty().with_reasoning("é".repeat(51));
        assert_eq!(QualityScorer::new().sub_scores(&response).unwrap().reasoning, 1.0);

        let response = OrchestrationResponse::empty().with_reasoning("é".repeat(30));
        assert_eq!(QualityScorer::new().sub_scores(&response).unwrap().reasoning, 0.0);
    }

    #[test]
    fn test_empty_pipeline_fails_fidelity() {
        let response = full_response().with_pipeline(Vec::new());
        assert_eq!(QualityScorer::new().sub_scores(&response).unwrap().fidelity, 0.0);
    }

    #[test]
    fn test_verifier_can_reject_proofs() {
        let scorer = QualityScorer::with_verifier(RejectAll);
        let subs = scorer.sub_scores(&full_response()).unwrap();
        assert_eq!(subs.fidelity, 0.0);
        assert!((subs.weighted() - 0.7).abs() < EPS);
    }

    #[test]
    fn test_verifier_failure_is_scoring_error() {
        let scorer = QualityScorer::with_verifier(Offline);
        assert!(matches!(
            scorer.score(&request(), &full_response()),
            Err(ScoringError::VerifierUnavailable(_))
        ));
    }

    #[test]
    fn test_irregular_pipeline_keeps_reasoning_and_utility() {
        let raw = serde_json::json!({
            "task_pipeline": [{"step": 1, "subnet": 62}],
            "reasoning_path": "r".repeat(80),
            "final_completion": "u".repeat(150),
        });
        let response: OrchestrationResponse = serde_json::from_value(raw).unwrap();

        let presence = QualityScorer::new().score(&request(), &response).unwrap();
        assert!((presence - 1.0).abs() < EPS);

        let strict = QualityScorer::with_verifier(WellFormed)
            .score(&request(), &response)
            .unwrap();
        assert!((strict - 0.7).abs() < EPS);
    }

    #[test]
    fn test_well_formed_verifier() {
        let ok = PipelineStep::new(1, SubnetId(62), "0xabc");
        assert!(WellFormed.verify(&ok).unwrap());

        for raw in [
            serde_json::json!({"step": 1, "subnet": 62, "proof": "  "}),
            serde_json::json!({"subnet": "SN62", "proof": "0xabc"}),
            serde_json::json!({"step": 1, "subnet": "text-gen", "proof": "0xabc"}),
        ] {
            let step: PipelineStep = serde_json::from_value(raw).unwrap();
            assert!(!WellFormed.verify(&step).unwrap());
        }

        let text_subnet: PipelineStep =
            serde_json::from_value(serde_json::json!({"step": 2, "subnet": "SN62", "proof": "0x1"}))
                .unwrap();
        assert!(WellFormed.verify(&text_subnet).unwrap());
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = QualityScorer::new();
        let response = full_response().with_completion("short");
        let a = scorer.score(&request(), &response).unwrap();
        let b = scorer.score(&request(), &response).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
