//! Executor: drives one job through its candidate list.
//!
//! Attempts are strictly sequential — never a parallel fan-out — because a
//! job must report exactly one authoritative cost and result. Each attempt
//! is bounded by `tokio::time::timeout`; on expiry the adapter future is
//! dropped, which aborts the in-flight network call rather than leaking it.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::time::timeout;

use switchboard_core::{Error as CoreError, NormalizedRequest};

use crate::config::ExecutionConfig;
use crate::jobs::JobRegistry;
use crate::registry::{Candidate, ProviderRegistry};
use crate::types::{Attempt, AttemptOutcome, JobError, JobId};

/// Executor shared by all in-flight jobs.
pub struct Executor {
    jobs: Arc<JobRegistry>,
    providers: Arc<ProviderRegistry>,
    config: ExecutionConfig,
}

impl Executor {
    /// Creates an executor over the given registries.
    #[must_use]
    pub fn new(
        jobs: Arc<JobRegistry>,
        providers: Arc<ProviderRegistry>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            jobs,
            providers,
            config,
        }
    }

    /// Drives a job through its candidates until one succeeds or all fail.
    ///
    /// Runs as its own spawned task; never blocks the submitter. Terminal
    /// writes can lose a race with shutdown force-failing the job, in
    /// which case the refused write is logged and dropped.
    pub async fn execute(&self, id: JobId, candidates: Vec<Candidate>) {
        let Some(job) = self.jobs.get(id) else {
            tracing::error!(job = %id, "executor started for unknown job");
            return;
        };

        if candidates.is_empty() {
            tracing::info!(job = %id, task_type = %job.task_type, "no eligible provider");
            self.finish_failed(id, JobError::no_provider());
            return;
        }

        self.jobs.mark_running(id);

        let request = NormalizedRequest::new(job.task_type.clone(), job.payload.clone());
        let attempt_timeout = self.config.timeout_for(job.requirements.latency);
        let candidate_count = candidates.len();
        let mut last_error = JobError::no_provider();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let started_at = SystemTime::now();
            let started = Instant::now();

            let outcome = timeout(attempt_timeout, candidate.adapter.invoke(&request)).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let error = match outcome {
                Ok(Ok(response)) => {
                    let cost = candidate.cost_model.cost(&response.usage);
                    self.providers.record_outcome(&candidate.name, true, latency_ms);
                    self.jobs.append_attempt(
                        id,
                        Attempt {
                            provider: candidate.name.clone(),
                            started_at,
                            ended_at: SystemTime::now(),
                            latency_ms,
                            outcome: AttemptOutcome::Success,
                            error_kind: None,
                        },
                    );
                    tracing::info!(
                        job = %id,
                        provider = %candidate.name,
                        latency_ms,
                        cost,
                        "job completed"
                    );
                    if let Err(refused) =
                        self.jobs.complete(id, candidate.name, response.raw, cost)
                    {
                        tracing::warn!(job = %id, error = %refused, "terminal write refused");
                    }
                    return;
                }
                Ok(Err(error)) => error,
                Err(_elapsed) => CoreError::Timeout(attempt_timeout.as_millis() as u64),
            };

            let kind = error.kind();
            self.providers.record_outcome(&candidate.name, false, latency_ms);
            self.jobs.append_attempt(
                id,
                Attempt {
                    provider: candidate.name.clone(),
                    started_at,
                    ended_at: SystemTime::now(),
                    latency_ms,
                    outcome: AttemptOutcome::Failure,
                    error_kind: Some(kind),
                },
            );
            tracing::warn!(
                job = %id,
                provider = %candidate.name,
                attempt = index + 1,
                of = candidate_count,
                error = %error,
                "attempt failed, advancing to next candidate"
            );
            last_error = JobError::attempt(kind, error.to_string());
        }

        // All candidates exhausted: the job fails with the last attempt's
        // error; earlier failures stay visible in the audit trail.
        self.finish_failed(id, last_error);
    }

    /// Applies a failed terminal transition, tolerating a shutdown race.
    fn finish_failed(&self, id: JobId, error: JobError) {
        if let Err(refused) = self.jobs.fail(id, error) {
            tracing::warn!(job = %id, error = %refused, "terminal write refused");
        }
    }
}
