//! Stats and cost aggregation, derived on demand from the job registry.
//!
//! Snapshots are always computed fresh from the current job records —
//! never cached — so they are consistent with the latest mutations.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{AttemptOutcome, Job, JobStatus};

/// Per-provider counters derived from the attempt audit trails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderStats {
    /// Attempts this provider served (successes and failures).
    pub jobs: u64,
    /// Failed attempts.
    pub failures: u64,
    /// Mean attempt latency in milliseconds.
    pub avg_latency_ms: f64,
    /// Cost attributed to jobs this provider completed.
    pub cost: f64,
}

/// Global and per-provider counters at one point in time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    /// Every job ever submitted, terminal or not.
    pub total_jobs: u64,
    /// Jobs in the `completed` terminal state.
    pub completed_jobs: u64,
    /// Jobs in the `failed` terminal state.
    pub failed_jobs: u64,
    /// Jobs still queued or running.
    pub in_flight_jobs: u64,
    /// Sum of cost across completed jobs.
    pub total_cost: f64,
    /// Mean cost per completed job; 0 when none completed.
    pub avg_cost_per_job: f64,
    /// Per-provider breakdown.
    pub provider_stats: HashMap<String, ProviderStats>,
}

/// Cost-focused view of the same aggregation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CostReport {
    /// Sum of cost across completed jobs.
    pub total_cost: f64,
    /// Mean cost per completed job; 0 when none completed.
    pub avg_cost_per_job: f64,
    /// Cost attributed to each completing provider.
    pub by_provider: HashMap<String, f64>,
}

/// Aggregates a snapshot over the given job records.
#[must_use]
pub fn aggregate(jobs: &[Job]) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot {
        total_jobs: jobs.len() as u64,
        ..StatsSnapshot::default()
    };
    let mut latency_sums: HashMap<String, (u64, u64)> = HashMap::new();

    for job in jobs {
        match job.status {
            JobStatus::Completed => {
                snapshot.completed_jobs += 1;
                snapshot.total_cost += job.cost;
                if let Some(provider) = &job.provider {
                    snapshot
                        .provider_stats
                        .entry(provider.clone())
                        .or_default()
                        .cost += job.cost;
                }
            }
            JobStatus::Failed => snapshot.failed_jobs += 1,
            JobStatus::Queued | JobStatus::Running => snapshot.in_flight_jobs += 1,
        }

        for attempt in &job.attempts {
            let stats = snapshot
                .provider_stats
                .entry(attempt.provider.clone())
                .or_default();
            stats.jobs += 1;
            if attempt.outcome == AttemptOutcome::Failure {
                stats.failures += 1;
            }
            let (total, count) = latency_sums.entry(attempt.provider.clone()).or_default();
            *total += attempt.latency_ms;
            *count += 1;
        }
    }

    for (provider, (total, count)) in latency_sums {
        if count > 0
            && let Some(stats) = snapshot.provider_stats.get_mut(&provider)
        {
            stats.avg_latency_ms = total as f64 / count as f64;
        }
    }

    if snapshot.completed_jobs > 0 {
        snapshot.avg_cost_per_job = snapshot.total_cost / snapshot.completed_jobs as f64;
    }

    snapshot
}

/// Aggregates the cost-focused report over the given job records.
#[must_use]
pub fn costs(jobs: &[Job]) -> CostReport {
    let snapshot = aggregate(jobs);
    CostReport {
        total_cost: snapshot.total_cost,
        avg_cost_per_job: snapshot.avg_cost_per_job,
        by_provider: snapshot
            .provider_stats
            .into_iter()
            .filter(|(_, stats)| stats.cost > 0.0)
            .map(|(name, stats)| (name, stats.cost))
            .collect(),
    }
}
