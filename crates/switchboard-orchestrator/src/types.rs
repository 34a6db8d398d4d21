use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use switchboard_core::{FailureKind, Requirements};

/// Unique identifier for a job, assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh job id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for JobId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(formatter)
    }
}

/// Caller-facing submission spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Task type string (for example `chat` or `hashing`).
    pub task_type: String,
    /// Opaque payload forwarded to the serving provider.
    pub payload: JsonValue,
    /// Optional routing requirements.
    #[serde(default)]
    pub requirements: Requirements,
}

impl JobSpec {
    /// Creates a spec with default requirements.
    pub fn new<T: Into<String>>(task_type: T, payload: JsonValue) -> Self {
        Self {
            task_type: task_type.into(),
            payload,
            requirements: Requirements::default(),
        }
    }

    /// Sets the routing requirements.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }
}

/// Job lifecycle state.
///
/// The only state machine in the system: queued → running →
/// {completed | failed}, with both terminal states absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, executor not yet started.
    Queued,
    /// Executor is driving attempts.
    Running,
    /// A provider produced the result.
    Completed,
    /// All candidates exhausted, or none were available.
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome of one provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// The attempt produced the job's result.
    Success,
    /// The attempt failed; the executor moved on.
    Failure,
}

/// One provider invocation on a job's append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Provider the attempt ran against.
    pub provider: String,
    /// Wall-clock start of the attempt.
    pub started_at: SystemTime,
    /// Wall-clock end of the attempt.
    pub ended_at: SystemTime,
    /// Observed attempt latency in milliseconds.
    pub latency_ms: u64,
    /// Whether the attempt succeeded.
    pub outcome: AttemptOutcome,
    /// Failure classification; present only on failed attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

/// Why a job reached the `failed` terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobErrorKind {
    /// Routing produced an empty candidate list.
    NoProviderAvailable,
    /// The last attempt failed with this kind after all candidates ran.
    Attempt(FailureKind),
    /// Shutdown's grace period expired while the job was in flight.
    ShutdownAborted,
}

/// Terminal error stored on a failed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    /// Failure classification.
    pub kind: JobErrorKind,
    /// Human-readable detail from the last attempt.
    pub message: String,
}

impl JobError {
    /// Error for a job no provider could serve.
    #[must_use]
    pub fn no_provider() -> Self {
        Self {
            kind: JobErrorKind::NoProviderAvailable,
            message: "no eligible provider for job".to_owned(),
        }
    }

    /// Error carrying a failed attempt's classification and detail.
    pub fn attempt<T: Into<String>>(kind: FailureKind, message: T) -> Self {
        Self {
            kind: JobErrorKind::Attempt(kind),
            message: message.into(),
        }
    }

    /// Error for a job aborted by shutdown.
    #[must_use]
    pub fn shutdown_aborted() -> Self {
        Self {
            kind: JobErrorKind::ShutdownAborted,
            message: "job aborted by shutdown grace period".to_owned(),
        }
    }
}

impl Display for JobError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            JobErrorKind::NoProviderAvailable => write!(formatter, "NoProviderAvailable"),
            JobErrorKind::Attempt(kind) => write!(formatter, "{kind:?}: {}", self.message),
            JobErrorKind::ShutdownAborted => write!(formatter, "ShutdownAborted"),
        }
    }
}

/// One unit of work tracked from submission to a terminal outcome.
///
/// Mutated exclusively by the executor after creation; callers observe
/// snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque unique identifier.
    pub id: JobId,
    /// Task type, immutable after submission.
    pub task_type: String,
    /// Caller-supplied payload, immutable after submission.
    pub payload: JsonValue,
    /// Routing requirements, immutable after submission.
    pub requirements: Requirements,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Append-only audit trail of provider attempts.
    pub attempts: Vec<Attempt>,
    /// Provider that produced the final result; set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Final result; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Terminal error; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    /// Cost of the successful attempt; 0 if the job failed entirely.
    pub cost: f64,
    /// When the job was submitted.
    pub submitted_at: SystemTime,
    /// When the first attempt started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<SystemTime>,
    /// When the job reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<SystemTime>,
}

impl Job {
    /// Creates a queued job from a submission spec.
    #[must_use]
    pub fn from_spec(spec: JobSpec) -> Self {
        Self {
            id: JobId::new(),
            task_type: spec.task_type,
            payload: spec.payload,
            requirements: spec.requirements,
            status: JobStatus::Queued,
            attempts: Vec::new(),
            provider: None,
            result: None,
            error: None,
            cost: 0.0,
            submitted_at: SystemTime::now(),
            started_at: None,
            completed_at: None,
        }
    }
}
