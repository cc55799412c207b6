//! Worker transport boundary.
//!
//! The coordinator never opens connections itself. Whatever carries
//! requests to workers (a network dendrite, an in-process stub) implements
//! `WorkerClient`.

use async_trait::async_trait;

use crate::protocol::{ObjectiveRequest, OrchestrationResponse, WorkerUid};

/// Handle to a single worker.
///
/// # Invariants
/// - `query` receives the request by shared reference and cannot modify it
/// - `uid()` is stable for the lifetime of the client
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Registry position of this worker.
    fn uid(&self) -> WorkerUid;

    /// Send an objective and wait for the worker's orchestration.
    async fn query(&self, request: &ObjectiveRequest) -> Result<OrchestrationResponse, QueryError>;

    /// Ask the worker for a Standard Payload extraction, as raw text.
    ///
    /// Workers that do not take part in the standardization task keep the
    /// default, which reports `QueryError::Unsupported`.
    async fn standardize(&self, _request: &ObjectiveRequest) -> Result<String, QueryError> {
        Err(QueryError::Unsupported)
    }
}

/// Why a worker produced no response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Worker did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Worker unreachable: {0}")]
    Unreachable(String),

    #[error("Worker rejected the request: {0}")]
    Rejected(String),

    #[error("Worker does not support this task")]
    Unsupported,
}

impl QueryError {
    /// Check if the failure came from the worker being slow or offline,
    /// rather than from an explicit refusal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unreachable(_))
    }
}
