//! Objective request and orchestration response records.
//!
//! # Invariants
//! - `ObjectiveRequest` is immutable once built; workers only ever see `&ObjectiveRequest`
//! - `OrchestrationResponse` fields are written by the worker and read-only afterwards

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for one dispatched objective.
///
/// # Properties
/// - Globally unique within a coordinator process
/// - Immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new unique request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a worker in the network's worker registry.
pub type WorkerUid = u16;

/// Identifier of an external specialized subnet a worker routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetId(pub u16);

impl SubnetId {
    /// Read a subnet identifier from a number or from text like `"SN62"` / `"62"`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()).map(Self),
            Value::String(s) => {
                let s = s.trim();
                let digits = s
                    .strip_prefix("SN")
                    .or_else(|| s.strip_prefix("sn"))
                    .unwrap_or(s);
                digits.parse().ok().map(Self)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for SubnetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SN{}", self.0)
    }
}

/// A task sent from the coordinator to every sampled worker.
///
/// # Invariants
/// - `objective` is non-empty after trimming (checked in `new`)
/// - No setter exists once the request has been handed to a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveRequest {
    id: RequestId,

    /// Multi-step task description
    objective: String,

    /// Auxiliary constraints (e.g. max latency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<Map<String, Value>>,
}

impl ObjectiveRequest {
    /// Create a new request.
    ///
    /// # Errors
    /// Returns `ProtocolError::EmptyObjective` if `objective` is blank.
    pub fn new(objective: impl Into<String>) -> Result<Self, ProtocolError> {
        let objective = objective.into();
        if objective.trim().is_empty() {
            return Err(ProtocolError::EmptyObjective);
        }

        Ok(Self {
            id: RequestId::new(),
            objective,
            context: None,
        })
    }

    /// Attach an auxiliary constraint. Consumes the request, so it can only
    /// be used while the coordinator still owns it.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn context(&self) -> Option<&Map<String, Value>> {
        self.context.as_ref()
    }

    /// Look up a single constraint by key.
    pub fn constraint(&self, key: &str) -> Option<&Value> {
        self.context.as_ref().and_then(|c| c.get(key))
    }
}

/// One recorded call to an external subnet.
///
/// Kept as the worker sent it. A record with odd or missing keys still
/// deserializes, so one bad entry never costs the worker its whole response;
/// the typed accessors return `None` and the `ProofVerifier` decides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineStep(Map<String, Value>);

impl PipelineStep {
    pub fn new(step: u32, subnet: SubnetId, proof: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("step".to_string(), step.into());
        fields.insert("subnet".to_string(), subnet.0.into());
        fields.insert("proof".to_string(), Value::String(proof.into()));
        Self(fields)
    }

    /// Position of the call in the pipeline, if it is a non-negative integer.
    pub fn step(&self) -> Option<u32> {
        self.0
            .get("step")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Target subnet, given either as a number (`62`) or as text (`"SN62"`).
    pub fn subnet(&self) -> Option<SubnetId> {
        self.0.get("subnet").and_then(SubnetId::from_value)
    }

    /// Opaque hash string proving the external computation.
    pub fn proof(&self) -> Option<&str> {
        self.0.get("proof").and_then(Value::as_str)
    }

    /// Any key the worker included, interpreted or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for PipelineStep {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A worker's answer to an `ObjectiveRequest`.
///
/// Every field may be absent. Absence is a valid, scoreable state: an empty
/// response (e.g. from a worker that timed out) scores 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResponse {
    /// Log of external subnet calls, in execution order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_pipeline: Option<Vec<PipelineStep>>,

    /// Explanation of the chosen routing strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_path: Option<String>,

    /// Synthesized final answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_completion: Option<String>,
}

impl OrchestrationResponse {
    /// Response with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, steps: Vec<PipelineStep>) -> Self {
        self.task_pipeline = Some(steps);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning_path = Some(reasoning.into());
        self
    }

    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.final_completion = Some(completion.into());
        self
    }

    /// The pipeline as a slice; empty when absent.
    pub fn pipeline(&self) -> &[PipelineStep] {
        self.task_pipeline.as_deref().unwrap_or(&[])
    }

    /// The synthesized answer, if the worker produced one.
    pub fn final_answer(&self) -> Option<&str> {
        self.final_completion.as_deref()
    }

    /// Consume the response and keep only the final answer.
    pub fn into_final_answer(self) -> Option<String> {
        self.final_completion
    }

    /// True when the worker filled none of the response fields.
    pub fn is_empty(&self) -> bool {
        self.task_pipeline.is_none() && self.reasoning_path.is_none() && self.final_completion.is_none()
    }
}

/// Errors raised while building protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Objective cannot be empty")]
    EmptyObjective,
}
