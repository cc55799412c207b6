//! Protocol module - the messages exchanged between coordinator and workers.
//!
//! A coordinator builds one `ObjectiveRequest`, broadcasts it, and collects
//! one `OrchestrationResponse` per worker. The request is never mutated by a
//! worker; the response is written by the worker and read-only afterwards.

mod message;

pub use message::{
    ObjectiveRequest, OrchestrationResponse, PipelineStep, ProtocolError, RequestId, SubnetId,
    WorkerUid,
};
