//! Coordinator module - one scoring epoch from dispatch to ledger update.
//!
//! # Epoch Flow
//! ```text
//! 1. Sample worker uids (sorted; this is the identity order for the epoch)
//! 2. Build one synthetic ObjectiveRequest
//! 3. Query all sampled workers concurrently, each under its own timeout
//! 4. Routing rewards: get_rewards over the responses, in uid order
//! 5. Standardization: validate each worker's payload (1.0 / 0.0)
//! 6. Combine with the configured weights
//! 7. Fold the incentives into the ScoreLedger
//! ```
//!
//! A slow, failing or unknown worker resolves to an empty response and a
//! failed payload, so its slot scores 0.0 without holding up the others.

mod client;
mod objectives;
mod reference;

pub use client::{QueryError, WorkerClient};
pub use objectives::{synthetic_request, MAX_LATENCY_KEY, OBJECTIVE_POOL};
pub use reference::ReferenceWorker;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::protocol::{ObjectiveRequest, OrchestrationResponse, ProtocolError, RequestId, WorkerUid};
use crate::reward::{
    calculate_combined_score, get_rewards, LedgerError, QualityScorer, ResponseScorer, ScoreLedger,
    WellFormed,
};
use crate::schema::standardization_score;

/// Outcome of one epoch, aligned by position with `uids`.
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub request_id: RequestId,
    pub objective: String,
    pub uids: Vec<WorkerUid>,
    /// Routing & synthesis score per worker
    pub routing: Vec<f64>,
    /// Standardization score per worker, if the task ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardization: Option<Vec<f64>>,
    /// Final incentive per worker
    pub incentives: Vec<f64>,
    /// Normalized ledger weights after this epoch, indexed by uid
    pub weights: Vec<f64>,
    pub completed_at: DateTime<Utc>,
}

/// Drives scoring epochs against a fixed set of workers.
///
/// Owns the cross-epoch `ScoreLedger`; nothing is shared globally.
pub struct Coordinator {
    config: Config,
    workers: BTreeMap<WorkerUid, Arc<dyn WorkerClient>>,
    scorer: Box<dyn ResponseScorer>,
    ledger: ScoreLedger,
}

impl Coordinator {
    /// Create a coordinator over `workers` using the quality scorer
    /// (with `WellFormed` proofs when `strict_proofs` is set).
    ///
    /// # Errors
    /// - `CoordinatorError::DuplicateWorker` if two clients report the same uid
    /// - `CoordinatorError::Ledger` if the configured alpha is out of range
    pub fn new(config: Config, workers: Vec<Arc<dyn WorkerClient>>) -> Result<Self, CoordinatorError> {
        let mut registry = BTreeMap::new();
        for worker in workers {
            let uid = worker.uid();
            if registry.insert(uid, worker).is_some() {
                return Err(CoordinatorError::DuplicateWorker(uid));
            }
        }

        let ledger = ScoreLedger::new(config.moving_average_alpha)?;
        debug!(
            "Coordinator ready: {} worker(s), ledger alpha {}",
            registry.len(),
            ledger.alpha()
        );

        let scorer: Box<dyn ResponseScorer> = if config.strict_proofs {
            Box::new(QualityScorer::with_verifier(WellFormed))
        } else {
            Box::new(QualityScorer::new())
        };

        Ok(Self {
            config,
            workers: registry,
            scorer,
            ledger,
        })
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Pick up to `sample_size` distinct registered uids, sorted ascending.
    pub fn sample_uids<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Vec<WorkerUid> {
        let registered: Vec<WorkerUid> = self.workers.keys().copied().collect();
        let amount = self.config.sample_size.min(registered.len());

        let mut uids: Vec<WorkerUid> = rand::seq::index::sample(rng, registered.len(), amount)
            .into_iter()
            .map(|i| registered[i])
            .collect();
        uids.sort_unstable();
        uids
    }

    /// Run one epoch with a random sample and a synthetic objective.
    ///
    /// # Errors
    /// Returns `CoordinatorError::NoWorkers` if nothing is registered.
    pub async fn run_epoch(&mut self) -> Result<EpochReport, CoordinatorError> {
        if self.workers.is_empty() {
            return Err(CoordinatorError::NoWorkers);
        }

        let (request, uids) = {
            let mut rng = rand::thread_rng();
            let latency_ms = self.config.query_timeout.as_millis() as u64;
            (synthetic_request(&mut rng, latency_ms)?, self.sample_uids(&mut rng))
        };

        self.run_epoch_with(request, &uids).await
    }

    /// Run one epoch for a given request and worker identity list.
    ///
    /// The returned vectors follow the order of `uids` exactly. Uids with no
    /// registered client score 0.0.
    pub async fn run_epoch_with(
        &mut self,
        request: ObjectiveRequest,
        uids: &[WorkerUid],
    ) -> Result<EpochReport, CoordinatorError> {
        info!(
            "Dispatching request {} to {} worker(s): {:?}",
            request.id(),
            uids.len(),
            uids
        );

        let timeout = self.config.query_timeout;
        let standardize = self.config.standardization_enabled;

        let collected = join_all(uids.iter().map(|&uid| {
            let worker = self.workers.get(&uid).cloned();
            let request = &request;
            async move {
                let Some(worker) = worker else {
                    warn!("Worker {} is not registered; scoring as empty", uid);
                    return (OrchestrationResponse::empty(), 0.0);
                };
                if standardize {
                    futures::join!(
                        collect_response(worker.as_ref(), request, timeout),
                        collect_standardization(worker.as_ref(), request, timeout),
                    )
                } else {
                    (collect_response(worker.as_ref(), request, timeout).await, 0.0)
                }
            }
        }))
        .await;

        let (responses, payload_scores): (Vec<OrchestrationResponse>, Vec<f64>) =
            collected.into_iter().unzip();

        let routing = get_rewards(self.scorer.as_ref(), &request, &responses);
        let incentives: Vec<f64> = if standardize {
            routing
                .iter()
                .zip(&payload_scores)
                .map(|(&r, &s)| calculate_combined_score(r, s, &self.config.weights))
                .collect()
        } else {
            routing.clone()
        };

        self.ledger.update(uids, &incentives)?;

        let report = EpochReport {
            request_id: request.id(),
            objective: request.objective().to_string(),
            uids: uids.to_vec(),
            routing,
            standardization: standardize.then_some(payload_scores),
            incentives,
            weights: self.ledger.normalized_weights(),
            completed_at: Utc::now(),
        };

        info!(
            "Epoch for request {} complete: mean incentive {:.3} over {} worker(s)",
            report.request_id,
            mean(&report.incentives),
            report.uids.len()
        );

        Ok(report)
    }
}

async fn collect_response(
    worker: &dyn WorkerClient,
    request: &ObjectiveRequest,
    timeout: Duration,
) -> OrchestrationResponse {
    let uid = worker.uid();
    match tokio::time::timeout(timeout, worker.query(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) if e.is_transient() => {
            warn!("Worker {} failed request {}: {}", uid, request.id(), e);
            OrchestrationResponse::empty()
        }
        Ok(Err(e)) => {
            info!("Worker {} refused request {}: {}", uid, request.id(), e);
            OrchestrationResponse::empty()
        }
        Err(_) => {
            let e = QueryError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            };
            warn!("Worker {} failed request {}: {}", uid, request.id(), e);
            OrchestrationResponse::empty()
        }
    }
}

async fn collect_standardization(
    worker: &dyn WorkerClient,
    request: &ObjectiveRequest,
    timeout: Duration,
) -> f64 {
    let uid = worker.uid();
    let raw = match tokio::time::timeout(timeout, worker.standardize(request)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            debug!("Worker {} returned no standard payload: {}", uid, e);
            return 0.0;
        }
        Err(_) => {
            debug!("Worker {} timed out on the standardization task", uid);
            return 0.0;
        }
    };

    let score = standardization_score(&raw);
    debug!("Worker {} standardization score {}", uid, score);
    score
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Errors that can occur while setting up or running an epoch.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("No workers registered")]
    NoWorkers,

    #[error("Worker uid {0} registered twice")]
    DuplicateWorker(WorkerUid),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
