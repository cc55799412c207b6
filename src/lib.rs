//! # SN-Orchestra
//!
//! Incentive scoring for a task-orchestration subnet.
//!
//! A coordinator dispatches multi-step objectives to workers, who route
//! sub-tasks to specialized subnets and synthesize a final answer. This
//! library turns each worker's response into one bounded incentive value.
//!
//! ## Architecture
//!
//! ```text
//!   ObjectiveRequest ──► workers ──► OrchestrationResponse ──┐
//!                          │                                 ▼
//!                          │                        QualityScorer (get_rewards)
//!                          ▼                                 │ routing
//!                  raw Standard Payload                      ▼
//!                          │                      calculate_combined_score ──► ScoreLedger
//!                          ▼                                 ▲
//!               validate_standard_payload ──────────────────┘
//!                      (1.0 / 0.0)           standardization
//! ```
//!
//! ## Modules
//! - `protocol`: request/response messages
//! - `schema`: strict Standard Payload validation
//! - `reward`: quality scoring, batch aggregation, weight combination, ledger
//! - `coordinator`: epoch driver and the worker client seam

pub mod config;
pub mod coordinator;
pub mod protocol;
pub mod reward;
pub mod schema;
pub mod util;

pub use config::Config;
pub use coordinator::{Coordinator, EpochReport, WorkerClient};
pub use protocol::{ObjectiveRequest, OrchestrationResponse, PipelineStep};
pub use reward::{calculate_combined_score, get_rewards, IncentiveWeights, QualityScorer};
pub use schema::{validate_standard_payload, StandardPayload};

/// Protocol version advertised by coordinator and workers.
///
/// Encoded as `major * 100 + minor * 10 + patch`.
pub const SUBNET_VERSION: u32 = 100;

/// Human-readable form of [`SUBNET_VERSION`] (`"1.0.0"`).
pub fn version() -> String {
    format!(
        "{}.{}.{}",
        SUBNET_VERSION / 100,
        (SUBNET_VERSION / 10) % 10,
        SUBNET_VERSION % 10
    )
}

pub fn log_version() {
    tracing::info!(
        "SN-Orchestra protocol v{} (crate {})",
        version(),
        env!("CARGO_PKG_VERSION")
    );
}
