//! Routing: turning a job's type and requirements into an ordered
//! candidate list.
//!
//! Routing is a pure, synchronous decision over a registry snapshot, so it
//! is unit-testable independent of any network behavior. The executor owns
//! everything that can fail at runtime.

use std::cmp::Ordering;
use std::sync::Arc;

use switchboard_core::{Latency, Requirements};

use crate::registry::{Candidate, ProviderRegistry};

/// Router producing ordered candidate lists from the provider registry.
pub struct Router {
    registry: Arc<ProviderRegistry>,
}

impl Router {
    /// Creates a router over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the ordered candidate list for a job.
    ///
    /// An explicit `requirements.provider` bypasses ranking: the list is
    /// exactly that provider, or empty if it is ineligible — never a
    /// silent substitution. Otherwise candidates are ranked by descending
    /// priority, tie-broken by observed latency for low-latency jobs and
    /// by estimated cost otherwise, with the name as a final deterministic
    /// tie-break. A `max_cost` ceiling drops candidates whose estimate
    /// exceeds it. An empty list is a legitimate result meaning "no
    /// eligible provider".
    pub fn route(&self, task_type: &str, requirements: &Requirements) -> Vec<Candidate> {
        let mut candidates = self.registry.eligible(task_type, requirements);

        if requirements.provider.is_none() {
            candidates.sort_by(|left, right| Self::rank(left, right, requirements.latency));
        }

        if let Some(max_cost) = requirements.max_cost {
            candidates.retain(|candidate| candidate.estimated_cost <= max_cost);
        }

        tracing::debug!(
            task_type,
            candidates = ?candidates.iter().map(|candidate| &candidate.name).collect::<Vec<_>>(),
            "routing decision"
        );

        candidates
    }

    /// Ordering between two candidates under a latency preference.
    fn rank(left: &Candidate, right: &Candidate, latency: Latency) -> Ordering {
        right
            .priority
            .cmp(&left.priority)
            .then_with(|| match latency {
                Latency::Low => {
                    // Providers with no latency sample yet sort last.
                    let left_latency = left.avg_latency_ms.unwrap_or(f64::INFINITY);
                    let right_latency = right.avg_latency_ms.unwrap_or(f64::INFINITY);
                    left_latency.total_cmp(&right_latency)
                }
                Latency::Normal => left.estimated_cost.total_cmp(&right.estimated_cost),
            })
            .then_with(|| left.name.cmp(&right.name))
    }
}
