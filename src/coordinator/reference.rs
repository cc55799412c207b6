//! In-process reference worker.
//!
//! Returns the canonical placeholder orchestration: one routed step on
//! SN62, a short routing explanation and a brief completion. Useful as a
//! baseline in local epochs and tests; it is not a decomposition engine.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::client::{QueryError, WorkerClient};
use crate::protocol::{ObjectiveRequest, OrchestrationResponse, PipelineStep, SubnetId, WorkerUid};

const REFERENCE_SUBNET: SubnetId = SubnetId(62);

#[derive(Debug, Clone)]
pub struct ReferenceWorker {
    uid: WorkerUid,
}

impl ReferenceWorker {
    pub fn new(uid: WorkerUid) -> Self {
        Self { uid }
    }
}

#[async_trait]
impl WorkerClient for ReferenceWorker {
    fn uid(&self) -> WorkerUid {
        self.uid
    }

    async fn query(&self, request: &ObjectiveRequest) -> Result<OrchestrationResponse, QueryError> {
        debug!("Worker {} received objective: {}", self.uid, request.objective());

        Ok(OrchestrationResponse::empty()
            .with_pipeline(vec![PipelineStep::new(1, REFERENCE_SUBNET, "0x...hash")])
            .with_reasoning(format!(
                "Step 1: Generated code via {} based on user prompt.",
                REFERENCE_SUBNET
            ))
            .with_completion("Here is the completed orchestration result..."))
    }

    async fn standardize(&self, _request: &ObjectiveRequest) -> Result<String, QueryError> {
        let payload = json!({
            "topic": "Decentralized Compute",
            "sentiment_score": 0.85,
            "sources": [REFERENCE_SUBNET.0, 13],
            "timestamp": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        });
        Ok(payload.to_string())
    }
}
