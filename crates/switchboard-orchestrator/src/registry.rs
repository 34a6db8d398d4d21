//! Provider registry: configured adapters plus mutable runtime health.
//!
//! Providers are registered once at startup and reused for every job.
//! Health fields are mutated by whichever executor task just finished an
//! attempt; each provider has its own lock, so concurrent jobs reporting
//! outcomes for different providers never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use switchboard_core::{CostModel, IgnoreLock as _, ProviderAdapter, ProviderConfig, Requirements};

use crate::config::HealthConfig;
use crate::error::{OrchestratorError, Result};

/// Runtime health for one provider, mutated only after attempts.
#[derive(Debug, Clone, Default)]
pub struct ProviderHealth {
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// When the most recent failure happened.
    pub last_failure_at: Option<Instant>,
    /// Exponential moving average of successful-attempt latency.
    pub rolling_avg_latency_ms: Option<f64>,
}

/// A registered provider: static config, adapter, runtime health.
struct RegisteredProvider {
    config: ProviderConfig,
    adapter: Arc<dyn ProviderAdapter>,
    health: Mutex<ProviderHealth>,
}

/// One routable provider in a router candidate list.
///
/// A snapshot: health fields are copied at eligibility time so routing
/// stays a pure function of its inputs.
#[derive(Clone)]
pub struct Candidate {
    /// Provider name.
    pub name: String,
    /// Routing priority (higher first).
    pub priority: i32,
    /// Deterministic cost estimate for ranking and ceilings.
    pub estimated_cost: f64,
    /// Observed rolling latency, if any attempt has succeeded yet.
    pub avg_latency_ms: Option<f64>,
    /// Adapter the executor will invoke.
    pub adapter: Arc<dyn ProviderAdapter>,
    /// Pricing applied to the adapter's reported usage.
    pub cost_model: CostModel,
}

/// Registry of configured providers keyed by name.
pub struct ProviderRegistry {
    providers: Mutex<HashMap<String, Arc<RegisteredProvider>>>,
    health_config: HealthConfig,
}

impl ProviderRegistry {
    /// Creates an empty registry with the given health settings.
    #[must_use]
    pub fn new(health_config: HealthConfig) -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
            health_config,
        }
    }

    /// Registers a provider.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::DuplicateProvider`] if the name is
    /// already registered; use [`Self::register_replacing`] to replace.
    pub fn register(&self, config: ProviderConfig, adapter: Arc<dyn ProviderAdapter>) -> Result<()> {
        let mut providers = self.providers.lock_ignore_poison();
        if providers.contains_key(&config.name) {
            return Err(OrchestratorError::DuplicateProvider(config.name));
        }
        let name = config.name.clone();
        providers.insert(
            name.clone(),
            Arc::new(RegisteredProvider {
                config,
                adapter,
                health: Mutex::new(ProviderHealth::default()),
            }),
        );
        tracing::info!(provider = %name, "registered provider");
        Ok(())
    }

    /// Registers a provider, replacing any existing definition.
    ///
    /// Replacement resets the provider's runtime health.
    pub fn register_replacing(&self, config: ProviderConfig, adapter: Arc<dyn ProviderAdapter>) {
        let mut providers = self.providers.lock_ignore_poison();
        let name = config.name.clone();
        providers.insert(
            name.clone(),
            Arc::new(RegisteredProvider {
                config,
                adapter,
                health: Mutex::new(ProviderHealth::default()),
            }),
        );
        tracing::info!(provider = %name, "replaced provider registration");
    }

    /// Whether the soft circuit breaker currently excludes this provider.
    fn breaker_open(&self, health: &ProviderHealth) -> bool {
        if health.consecutive_failures < self.health_config.failure_threshold {
            return false;
        }
        match health.last_failure_at {
            Some(at) => at.elapsed() < self.health_config.cooldown(),
            None => false,
        }
    }

    /// Returns snapshots of all providers eligible for a job.
    ///
    /// A provider is eligible when it is enabled, its capabilities cover
    /// the task type, it matches an explicit provider requirement if one
    /// is set, and its circuit breaker is closed. An empty result is a
    /// valid outcome, not an error.
    pub fn eligible(&self, task_type: &str, requirements: &Requirements) -> Vec<Candidate> {
        let providers = self.providers.lock_ignore_poison();
        providers
            .values()
            .filter(|provider| provider.config.enabled)
            .filter(|provider| provider.config.serves(task_type))
            .filter(|provider| {
                requirements
                    .provider
                    .as_ref()
                    .is_none_or(|pinned| *pinned == provider.config.name)
            })
            .filter(|provider| {
                let health = provider.health.lock_ignore_poison();
                !self.breaker_open(&health)
            })
            .map(|provider| {
                let health = provider.health.lock_ignore_poison();
                Candidate {
                    name: provider.config.name.clone(),
                    priority: provider.config.priority,
                    estimated_cost: provider.config.cost_model.estimate(),
                    avg_latency_ms: health.rolling_avg_latency_ms,
                    adapter: Arc::clone(&provider.adapter),
                    cost_model: provider.config.cost_model,
                }
            })
            .collect()
    }

    /// Records an attempt outcome against a provider's health.
    ///
    /// Success resets the failure streak and folds the latency sample
    /// into the rolling average; failure increments the streak and stamps
    /// the failure time. Unknown names are ignored (the provider may have
    /// been replaced mid-flight).
    pub fn record_outcome(&self, name: &str, success: bool, latency_ms: u64) {
        let provider = {
            let providers = self.providers.lock_ignore_poison();
            providers.get(name).map(Arc::clone)
        };
        let Some(provider) = provider else {
            tracing::debug!(provider = %name, "outcome for unknown provider dropped");
            return;
        };

        let mut health = provider.health.lock_ignore_poison();
        if success {
            health.consecutive_failures = 0;
            let alpha = self.health_config.latency_ema_alpha;
            let sample = latency_ms as f64;
            health.rolling_avg_latency_ms = Some(match health.rolling_avg_latency_ms {
                Some(old) => (1.0 - alpha) * old + alpha * sample,
                None => sample,
            });
        } else {
            health.consecutive_failures += 1;
            health.last_failure_at = Some(Instant::now());
            if health.consecutive_failures == self.health_config.failure_threshold {
                tracing::warn!(
                    provider = %name,
                    failures = health.consecutive_failures,
                    cooldown_ms = self.health_config.cooldown_ms,
                    "provider circuit breaker tripped"
                );
            }
        }
    }

    /// Snapshot of a provider's health, for observation and tests.
    pub fn health(&self, name: &str) -> Option<ProviderHealth> {
        let providers = self.providers.lock_ignore_poison();
        providers
            .get(name)
            .map(|provider| provider.health.lock_ignore_poison().clone())
    }

    /// Names of all registered providers.
    pub fn provider_names(&self) -> Vec<String> {
        let providers = self.providers.lock_ignore_poison();
        providers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use switchboard_core::{AdapterResponse, NormalizedRequest, Usage};

    struct NullAdapter;

    #[async_trait]
    impl ProviderAdapter for NullAdapter {
        fn name(&self) -> &str {
            "null"
        }

        async fn invoke(
            &self,
            _request: &NormalizedRequest,
        ) -> switchboard_core::Result<AdapterResponse> {
            Ok(AdapterResponse::new(serde_json::Value::Null, Usage::default()))
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(HealthConfig::default())
    }

    fn adapter() -> Arc<dyn ProviderAdapter> {
        Arc::new(NullAdapter)
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = registry();
        registry
            .register(ProviderConfig::new("alpha"), adapter())
            .unwrap();
        let error = registry
            .register(ProviderConfig::new("alpha"), adapter())
            .unwrap_err();
        assert!(matches!(error, OrchestratorError::DuplicateProvider(_)));

        // Explicit replacement is allowed.
        registry.register_replacing(ProviderConfig::new("alpha").with_priority(5), adapter());
        let eligible = registry.eligible("chat", &Requirements::default());
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].priority, 5);
    }

    #[test]
    fn test_eligibility_filters() {
        let registry = registry();
        registry
            .register(
                ProviderConfig::new("chatty").with_capabilities(["chat"]),
                adapter(),
            )
            .unwrap();
        registry
            .register(ProviderConfig::new("generic"), adapter())
            .unwrap();
        registry
            .register(ProviderConfig::new("off").disabled(), adapter())
            .unwrap();

        let chat = registry.eligible("chat", &Requirements::default());
        assert_eq!(chat.len(), 2);

        let embeddings = registry.eligible("embeddings", &Requirements::default());
        assert_eq!(embeddings.len(), 1);
        assert_eq!(embeddings[0].name, "generic");

        // Explicit pin to a disabled provider yields nothing.
        let pinned = registry.eligible("chat", &Requirements::new().with_provider("off"));
        assert!(pinned.is_empty());
    }

    #[test]
    fn test_breaker_trips_after_threshold() {
        let registry = registry();
        registry
            .register(ProviderConfig::new("flaky"), adapter())
            .unwrap();

        for _ in 0..3 {
            registry.record_outcome("flaky", false, 10);
        }
        assert!(registry.eligible("chat", &Requirements::default()).is_empty());

        // A success closes the breaker again.
        registry.record_outcome("flaky", true, 10);
        assert_eq!(registry.eligible("chat", &Requirements::default()).len(), 1);
    }

    #[test]
    fn test_breaker_reopens_after_cooldown() {
        let health_config = HealthConfig {
            failure_threshold: 1,
            cooldown_ms: 0,
            latency_ema_alpha: 0.2,
        };
        let registry = ProviderRegistry::new(health_config);
        registry
            .register(ProviderConfig::new("flaky"), adapter())
            .unwrap();

        registry.record_outcome("flaky", false, 10);
        // Zero cooldown: the breaker is already past its window.
        assert_eq!(registry.eligible("chat", &Requirements::default()).len(), 1);
    }

    #[test]
    fn test_latency_ema_seeded_then_smoothed() {
        let registry = registry();
        registry
            .register(ProviderConfig::new("alpha"), adapter())
            .unwrap();

        registry.record_outcome("alpha", true, 100);
        let health = registry.health("alpha").unwrap();
        assert_eq!(health.rolling_avg_latency_ms, Some(100.0));

        registry.record_outcome("alpha", true, 200);
        let health = registry.health("alpha").unwrap();
        let avg = health.rolling_avg_latency_ms.unwrap();
        // 0.8 * 100 + 0.2 * 200
        assert!((avg - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_failure_streak_resets_on_success() {
        let registry = registry();
        registry
            .register(ProviderConfig::new("alpha"), adapter())
            .unwrap();

        registry.record_outcome("alpha", false, 10);
        registry.record_outcome("alpha", false, 10);
        assert_eq!(registry.health("alpha").unwrap().consecutive_failures, 2);

        registry.record_outcome("alpha", true, 10);
        assert_eq!(registry.health("alpha").unwrap().consecutive_failures, 0);
    }
}
