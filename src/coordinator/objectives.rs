//! Synthetic objectives the coordinator dispatches each epoch.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::protocol::{ObjectiveRequest, ProtocolError};

/// Context key carrying the per-worker latency budget.
pub const MAX_LATENCY_KEY: &str = "max_latency_ms";

/// Multi-step objectives that require routing across several subnets.
pub const OBJECTIVE_POOL: &[&str] = &[
    "Create a Python scraper for news and summarize trends.",
    "Collect recent discussion about decentralized compute and report the overall sentiment.",
    "Generate a data-cleaning script, run it over the latest market snapshot, and explain the anomalies.",
    "Translate the top five research abstracts on protein folding and synthesize a one-paragraph overview.",
    "Find open-source inference servers, compare their throughput claims, and recommend one.",
];

/// Pick an objective and wrap it in a request carrying the latency budget.
pub fn synthetic_request<R: Rng + ?Sized>(
    rng: &mut R,
    max_latency_ms: u64,
) -> Result<ObjectiveRequest, ProtocolError> {
    let objective = OBJECTIVE_POOL.choose(rng).copied().unwrap_or(OBJECTIVE_POOL[0]);
    Ok(ObjectiveRequest::new(objective)?.with_context(MAX_LATENCY_KEY, max_latency_ms))
}
