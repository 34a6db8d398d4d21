use std::result::Result as StdResult;

use switchboard_core::Error as CoreError;
use thiserror::Error;

use crate::types::{JobError, JobId};

/// Result type for orchestrator operations.
pub type Result<T> = StdResult<T, OrchestratorError>;

/// Errors surfaced by the orchestrator facade and its components.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// An adapter-boundary error bubbled up unchanged.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Submission rejected synchronously: empty or blank task type.
    #[error("Invalid task type: {0:?}")]
    InvalidTaskType(String),

    /// Submission rejected synchronously: payload missing.
    #[error("Payload missing from submission")]
    MissingPayload,

    /// A provider with this name is already registered.
    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),

    /// No referenced provider exists under this name.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Routing produced an empty candidate list for the job.
    #[error("No provider available")]
    NoProviderAvailable,

    /// No job exists under this id.
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    /// `wait_for` gave up before the job reached a terminal state.
    ///
    /// The underlying job keeps running and can be observed later.
    #[error("Timed out waiting for job {0}")]
    WaitTimeout(JobId),

    /// The job reached the `failed` terminal state.
    #[error("Job failed: {0}")]
    JobFailed(JobError),

    /// Submission refused because shutdown has begun.
    #[error("Orchestrator is shutting down")]
    ShuttingDown,

    /// Internal invariant violated; indicates a caller bug, not a runtime
    /// condition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = OrchestratorError::InvalidTaskType(String::new());
        assert_eq!(error.to_string(), "Invalid task type: \"\"");

        let error = OrchestratorError::NoProviderAvailable;
        assert_eq!(error.to_string(), "No provider available");
    }

    #[test]
    fn test_core_error_conversion() {
        let core = CoreError::Provider("backend down".to_owned());
        let error: OrchestratorError = core.into();
        assert!(matches!(error, OrchestratorError::Core(_)));
    }
}
