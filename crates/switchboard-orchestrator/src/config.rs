//! Configuration types for execution, provider health, and shutdown.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use switchboard_core::{Latency, ProviderConfig};

/// Complete orchestrator configuration.
///
/// Loaded once at process start; runtime provider changes go through
/// [`crate::ProviderRegistry::register`], never through file reloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-attempt execution settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Provider health and circuit-breaker settings.
    #[serde(default)]
    pub health: HealthConfig,
    /// Shutdown grace settings.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    /// Static provider list; adapters are attached in code by name.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl OrchestratorConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config = toml::from_str(text).map_err(switchboard_core::Error::from)?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(switchboard_core::Error::from)?;
        Self::from_toml_str(&text)
    }

    /// Looks up the static config entry for a provider name.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|provider| provider.name == name)
    }
}

/// Per-attempt execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Attempt timeout for normal-latency jobs, in milliseconds.
    pub attempt_timeout_ms: u64,
    /// Attempt timeout for low-latency jobs, in milliseconds.
    pub low_latency_timeout_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 20_000,
            low_latency_timeout_ms: 5_000,
        }
    }
}

impl ExecutionConfig {
    /// Attempt timeout for the given latency preference.
    pub fn timeout_for(&self, latency: Latency) -> Duration {
        match latency {
            Latency::Low => Duration::from_millis(self.low_latency_timeout_ms),
            Latency::Normal => Duration::from_millis(self.attempt_timeout_ms),
        }
    }
}

/// Provider health and circuit-breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Consecutive failures that trip the soft circuit breaker.
    pub failure_threshold: u32,
    /// How long a tripped provider stays ineligible, in milliseconds.
    pub cooldown_ms: u64,
    /// Weight of the newest sample in the rolling latency average.
    pub latency_ema_alpha: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_ms: 30_000,
            latency_ema_alpha: 0.2,
        }
    }
}

impl HealthConfig {
    /// Circuit-breaker cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Shutdown grace settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// How long shutdown waits for in-flight jobs, in milliseconds.
    pub grace_period_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 5_000,
        }
    }
}

impl ShutdownConfig {
    /// Shutdown grace period as a duration.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.execution.attempt_timeout_ms, 20_000);
        assert_eq!(config.health.failure_threshold, 3);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_timeout_for_latency() {
        let execution = ExecutionConfig::default();
        assert_eq!(
            execution.timeout_for(Latency::Low),
            Duration::from_millis(5_000)
        );
        assert_eq!(
            execution.timeout_for(Latency::Normal),
            Duration::from_millis(20_000)
        );
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            [execution]
            attempt_timeout_ms = 1000
            low_latency_timeout_ms = 250

            [[providers]]
            name = "alpha"
            priority = 10
            capabilities = ["chat"]

            [[providers]]
            name = "beta"
            enabled = false
        "#;

        let config = match OrchestratorConfig::from_toml_str(text) {
            Ok(config) => config,
            Err(error) => panic!("parse failed: {error}"),
        };

        assert_eq!(config.execution.attempt_timeout_ms, 1000);
        assert_eq!(config.providers.len(), 2);

        let alpha = match config.provider("alpha") {
            Some(alpha) => alpha,
            None => panic!("alpha missing"),
        };
        assert_eq!(alpha.priority, 10);
        assert!(alpha.serves("chat"));
        assert!(!alpha.serves("embeddings"));

        let beta = match config.provider("beta") {
            Some(beta) => beta,
            None => panic!("beta missing"),
        };
        assert!(!beta.enabled);

        // Sections not present fall back to defaults.
        assert_eq!(config.health.failure_threshold, 3);
        assert_eq!(config.shutdown.grace_period_ms, 5_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("tempdir failed: {error}"),
        };
        let path = dir.path().join("switchboard.toml");
        if let Err(error) = fs::write(
            &path,
            "[health]\nfailure_threshold = 5\ncooldown_ms = 100\nlatency_ema_alpha = 0.5\n",
        ) {
            panic!("write failed: {error}");
        }

        let config = match OrchestratorConfig::load(&path) {
            Ok(config) => config,
            Err(error) => panic!("load failed: {error}"),
        };
        assert_eq!(config.health.failure_threshold, 5);
        assert!((config.health.latency_ema_alpha - 0.5).abs() < f64::EPSILON);

        let missing = OrchestratorConfig::load(&dir.path().join("absent.toml"));
        assert!(missing.is_err());
    }
}
