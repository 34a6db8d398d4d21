//! Multi-provider task orchestrator.
//!
//! A single front door that accepts compute and inference jobs and
//! dispatches each to one of many interchangeable backend providers,
//! tracking outcome, latency, and spend per job and per provider.
//!
//! The orchestrator is in-process and single-node: the job registry lives
//! in memory for the process lifetime, and every job's execution is an
//! independent concurrent task. See [`Orchestrator`] for the public
//! surface.

/// Configuration for execution, health, and shutdown.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Per-job execution: the sequential attempt loop.
pub mod executor;
/// In-memory job registry.
pub mod jobs;
/// The public facade.
pub mod orchestrator;
/// Provider registry with runtime health.
pub mod registry;
/// Candidate selection and ranking.
pub mod router;
/// Stats and cost aggregation.
pub mod stats;
/// Job and attempt data types.
pub mod types;

pub use config::{ExecutionConfig, HealthConfig, OrchestratorConfig, ShutdownConfig};
pub use error::{OrchestratorError, Result};
pub use executor::Executor;
pub use jobs::JobRegistry;
pub use orchestrator::Orchestrator;
pub use registry::{Candidate, ProviderHealth, ProviderRegistry};
pub use router::Router;
pub use stats::{CostReport, ProviderStats, StatsSnapshot};
pub use types::{
    Attempt, AttemptOutcome, Job, JobError, JobErrorKind, JobId, JobSpec, JobStatus,
};
