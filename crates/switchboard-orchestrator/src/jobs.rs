//! In-memory job registry: the only mutable shared state in the system.
//!
//! Each job record is mutated exclusively by the executor task driving
//! that job; different jobs' records are disjoint, so one map-level lock
//! (never held across an await) is all the coordination needed. Terminal
//! transitions are published on a per-job watch channel so `wait_for` can
//! subscribe instead of spinning.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value as JsonValue;
use tokio::sync::watch;

use switchboard_core::IgnoreLock as _;

use crate::error::{OrchestratorError, Result};
use crate::types::{Attempt, Job, JobError, JobId, JobSpec, JobStatus};

/// One tracked job plus its terminal-state notifier.
struct JobEntry {
    job: Job,
    status_tx: watch::Sender<JobStatus>,
}

/// In-memory map of job id to job record.
///
/// No deletion or eviction: retention of old records is the embedding
/// application's concern.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, JobEntry>>,
}

impl JobRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queued job from a spec and stores it.
    pub fn create(&self, spec: JobSpec) -> Job {
        let job = Job::from_spec(spec);
        let (status_tx, _) = watch::channel(job.status);
        let mut jobs = self.jobs.lock_ignore_poison();
        jobs.insert(
            job.id,
            JobEntry {
                job: job.clone(),
                status_tx,
            },
        );
        job
    }

    /// Snapshot of one job.
    pub fn get(&self, id: JobId) -> Option<Job> {
        let jobs = self.jobs.lock_ignore_poison();
        jobs.get(&id).map(|entry| entry.job.clone())
    }

    /// Subscribes to a job's status transitions.
    pub fn subscribe(&self, id: JobId) -> Option<watch::Receiver<JobStatus>> {
        let jobs = self.jobs.lock_ignore_poison();
        jobs.get(&id).map(|entry| entry.status_tx.subscribe())
    }

    /// Snapshot of every job, for stats aggregation.
    pub fn snapshot_all(&self) -> Vec<Job> {
        let jobs = self.jobs.lock_ignore_poison();
        jobs.values().map(|entry| entry.job.clone()).collect()
    }

    /// Ids of jobs not yet in a terminal state.
    pub fn active_ids(&self) -> Vec<JobId> {
        let jobs = self.jobs.lock_ignore_poison();
        jobs.values()
            .filter(|entry| !entry.job.status.is_terminal())
            .map(|entry| entry.job.id)
            .collect()
    }

    /// Marks a job running and stamps `started_at` on first call.
    pub fn mark_running(&self, id: JobId) {
        let mut jobs = self.jobs.lock_ignore_poison();
        if let Some(entry) = jobs.get_mut(&id)
            && entry.job.status == JobStatus::Queued
        {
            entry.job.status = JobStatus::Running;
            entry.job.started_at = Some(SystemTime::now());
            entry.status_tx.send_replace(JobStatus::Running);
        }
    }

    /// Appends one attempt to a job's audit trail.
    pub fn append_attempt(&self, id: JobId, attempt: Attempt) {
        let mut jobs = self.jobs.lock_ignore_poison();
        if let Some(entry) = jobs.get_mut(&id) {
            entry.job.attempts.push(attempt);
        }
    }

    /// Terminal transition to `completed`.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::InvariantViolation`] if the job is
    /// already terminal: each job transitions to a terminal state exactly
    /// once, and a second write indicates a caller bug (or a lost race
    /// with shutdown, which the executor tolerates).
    pub fn complete(
        &self,
        id: JobId,
        provider: String,
        result: JsonValue,
        cost: f64,
    ) -> Result<()> {
        self.terminal(id, |job| {
            job.status = JobStatus::Completed;
            job.provider = Some(provider);
            job.result = Some(result);
            job.cost = cost;
        })
    }

    /// Terminal transition to `failed`.
    ///
    /// # Errors
    /// Same single-terminal-write guard as [`Self::complete`].
    pub fn fail(&self, id: JobId, error: JobError) -> Result<()> {
        self.terminal(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
        })
    }

    /// Applies a guarded terminal mutation and notifies subscribers.
    fn terminal<F: FnOnce(&mut Job)>(&self, id: JobId, mutate: F) -> Result<()> {
        let mut jobs = self.jobs.lock_ignore_poison();
        let entry = jobs
            .get_mut(&id)
            .ok_or(OrchestratorError::JobNotFound(id))?;
        if entry.job.status.is_terminal() {
            return Err(OrchestratorError::InvariantViolation(format!(
                "job {id} already terminal ({:?})",
                entry.job.status
            )));
        }
        mutate(&mut entry.job);
        entry.job.completed_at = Some(SystemTime::now());
        entry.status_tx.send_replace(entry.job.status);
        Ok(())
    }
}
