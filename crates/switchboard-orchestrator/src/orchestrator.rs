use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};

use switchboard_core::ProviderAdapter;

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::executor::Executor;
use crate::jobs::JobRegistry;
use crate::registry::ProviderRegistry;
use crate::router::Router;
use crate::stats::{CostReport, StatsSnapshot, aggregate, costs};
use crate::types::{Job, JobError, JobId, JobSpec, JobStatus};

/// Poll interval while shutdown drains in-flight jobs.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Public entry point composing registry, router, executor, and job store.
///
/// Owns its registries explicitly — construct one per process (or per
/// test) and drive its lifecycle through [`Self::shutdown`]; there is no
/// process-wide singleton.
pub struct Orchestrator {
    config: OrchestratorConfig,
    providers: Arc<ProviderRegistry>,
    jobs: Arc<JobRegistry>,
    router: Router,
    executor: Arc<Executor>,
    shutting_down: AtomicBool,
}

impl Orchestrator {
    /// Creates an orchestrator with no providers attached yet.
    ///
    /// The config's static provider list supplies definitions; adapters
    /// are attached by name via [`Self::attach_adapter`], or in full via
    /// [`Self::register_provider`].
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        let providers = Arc::new(ProviderRegistry::new(config.health.clone()));
        let jobs = Arc::new(JobRegistry::new());
        let router = Router::new(Arc::clone(&providers));
        let executor = Arc::new(Executor::new(
            Arc::clone(&jobs),
            Arc::clone(&providers),
            config.execution.clone(),
        ));
        Self {
            config,
            providers,
            jobs,
            router,
            executor,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Attaches an adapter to a provider defined in the static config.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::UnknownProvider`] if the config has no
    /// entry under the adapter's name, or `DuplicateProvider` if it is
    /// already attached.
    pub fn attach_adapter(&self, adapter: Arc<dyn ProviderAdapter>) -> Result<()> {
        let config = self
            .config
            .provider(adapter.name())
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownProvider(adapter.name().to_owned()))?;
        self.providers.register(config, adapter)
    }

    /// Registers a provider definition and adapter directly.
    pub fn register_provider(
        &self,
        config: switchboard_core::ProviderConfig,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Result<()> {
        self.providers.register(config, adapter)
    }

    /// The provider registry, for health inspection and replacement.
    pub fn providers(&self) -> &Arc<ProviderRegistry> {
        &self.providers
    }

    /// Submits a job for asynchronous execution.
    ///
    /// Validates synchronously, creates the job record, routes, and spawns
    /// the executor without waiting for it. The returned snapshot shows
    /// `queued` (or already `running`, depending on scheduling latency);
    /// callers must not assume synchronous completion.
    ///
    /// # Errors
    /// [`OrchestratorError::InvalidTaskType`] for an empty or blank type,
    /// [`OrchestratorError::MissingPayload`] for a null payload,
    /// [`OrchestratorError::ShuttingDown`] after shutdown has begun. No
    /// job record is created in any of these cases.
    pub fn submit(&self, spec: JobSpec) -> Result<Job> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ShuttingDown);
        }
        if spec.task_type.trim().is_empty() {
            return Err(OrchestratorError::InvalidTaskType(spec.task_type));
        }
        if spec.payload.is_null() {
            return Err(OrchestratorError::MissingPayload);
        }

        let job = self.jobs.create(spec);
        let candidates = self.router.route(&job.task_type, &job.requirements);
        tracing::info!(
            job = %job.id,
            task_type = %job.task_type,
            candidates = candidates.len(),
            "job submitted"
        );

        let executor = Arc::clone(&self.executor);
        let id = job.id;
        tokio::spawn(async move {
            executor.execute(id, candidates).await;
        });

        Ok(job)
    }

    /// Submits each spec independently; one invalid spec never prevents
    /// the others, and completion order is unrelated to submission order.
    pub fn submit_batch(&self, specs: Vec<JobSpec>) -> Vec<Result<Job>> {
        specs.into_iter().map(|spec| self.submit(spec)).collect()
    }

    /// Snapshot of a job by id.
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.get(id)
    }

    /// Waits until the job reaches a terminal state or the timeout lapses.
    ///
    /// Resolves with the result on `completed` and rejects with the job's
    /// error on `failed`. On expiry it rejects with
    /// [`OrchestratorError::WaitTimeout`] **without** cancelling the job:
    /// the job keeps running and can still be observed later via
    /// [`Self::get`] or a second `wait_for`.
    pub async fn wait_for(&self, id: JobId, wait_timeout: Duration) -> Result<JsonValue> {
        let mut receiver = self
            .jobs
            .subscribe(id)
            .ok_or(OrchestratorError::JobNotFound(id))?;

        let waited = timeout(
            wait_timeout,
            receiver.wait_for(|status| status.is_terminal()),
        )
        .await;

        match waited {
            Ok(Ok(_)) => self.terminal_outcome(id),
            // The registry never drops a job's sender while the job exists.
            Ok(Err(_closed)) => Err(OrchestratorError::JobNotFound(id)),
            Err(_elapsed) => Err(OrchestratorError::WaitTimeout(id)),
        }
    }

    /// Reads a terminal job's outcome out of the registry.
    fn terminal_outcome(&self, id: JobId) -> Result<JsonValue> {
        let job = self.jobs.get(id).ok_or(OrchestratorError::JobNotFound(id))?;
        match job.status {
            JobStatus::Completed => Ok(job.result.unwrap_or(JsonValue::Null)),
            JobStatus::Failed => Err(OrchestratorError::JobFailed(
                job.error.unwrap_or_else(JobError::no_provider),
            )),
            JobStatus::Queued | JobStatus::Running => Err(OrchestratorError::InvariantViolation(
                format!("job {id} observed non-terminal after terminal notification"),
            )),
        }
    }

    /// Fresh stats snapshot over every job; never mutates state.
    pub fn stats(&self) -> StatsSnapshot {
        aggregate(&self.jobs.snapshot_all())
    }

    /// Fresh cost report over every job; never mutates state.
    pub fn costs(&self) -> CostReport {
        costs(&self.jobs.snapshot_all())
    }

    /// Stops accepting submissions and drains in-flight jobs.
    ///
    /// Waits up to the configured grace period for running jobs to reach a
    /// terminal state; jobs still in flight afterwards are force-failed
    /// with `ShutdownAborted`.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + self.config.shutdown.grace_period();
        tracing::info!("shutdown started, draining in-flight jobs");

        loop {
            let active = self.jobs.active_ids();
            if active.is_empty() {
                tracing::info!("shutdown complete, all jobs terminal");
                return;
            }
            if Instant::now() >= deadline {
                tracing::warn!(aborted = active.len(), "shutdown grace period expired");
                for id in active {
                    // A job may complete between the snapshot and this
                    // write; the refused transition is the job winning.
                    if let Err(error) = self.jobs.fail(id, JobError::shutdown_aborted()) {
                        tracing::debug!(job = %id, error = %error, "job finished during abort");
                    }
                }
                return;
            }
            sleep(SHUTDOWN_POLL).await;
        }
    }
}
