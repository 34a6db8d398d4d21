//! Provider configuration and usage-based cost models.

use serde::{Deserialize, Serialize};

use crate::Usage;

/// Pricing model for one provider, applied to adapter-reported usage.
///
/// All rates are USD. A provider that charges a flat fee per call sets
/// only `fixed_fee`; token-metered backends set the per-million rates;
/// byte-metered backends set `per_gigabyte`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CostModel {
    /// Flat fee charged per call.
    #[serde(default)]
    pub fixed_fee: f64,
    /// Rate per million input tokens.
    #[serde(default)]
    pub per_million_input_tokens: f64,
    /// Rate per million output tokens.
    #[serde(default)]
    pub per_million_output_tokens: f64,
    /// Rate per gigabyte processed.
    #[serde(default)]
    pub per_gigabyte: f64,
}

/// Nominal usage a routing decision prices when ranking candidates.
const NOMINAL_USAGE: Usage = Usage {
    input_tokens: 1000,
    output_tokens: 1000,
    bytes: 1_000_000,
};

impl CostModel {
    /// A model that charges nothing (local or self-hosted backends).
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }

    /// A model charging per million input/output tokens.
    #[must_use]
    pub fn per_token(input_rate: f64, output_rate: f64) -> Self {
        Self {
            per_million_input_tokens: input_rate,
            per_million_output_tokens: output_rate,
            ..Self::default()
        }
    }

    /// Sets a flat per-call fee on top of metered rates.
    #[must_use]
    pub fn with_fixed_fee(mut self, fee: f64) -> Self {
        self.fixed_fee = fee;
        self
    }

    /// Computes the cost in USD of a completed call from reported usage.
    ///
    /// Never negative: negative configured rates are clamped to zero.
    pub fn cost(&self, usage: &Usage) -> f64 {
        let tokens = (usage.input_tokens as f64 / 1e6) * self.per_million_input_tokens
            + (usage.output_tokens as f64 / 1e6) * self.per_million_output_tokens;
        let bytes = (usage.bytes as f64 / 1e9) * self.per_gigabyte;
        (self.fixed_fee + tokens + bytes).max(0.0)
    }

    /// Deterministic cost estimate for ranking and `max_cost` ceilings.
    ///
    /// Prices a fixed nominal usage so that two calls with the same
    /// registry state always produce the same ordering.
    pub fn estimate(&self) -> f64 {
        self.cost(&NOMINAL_USAGE)
    }
}

/// Static configuration for one provider, loaded at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name.
    pub name: String,
    /// Disabled providers are never routable.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Higher priority routes first among equally-eligible candidates.
    #[serde(default)]
    pub priority: i32,
    /// Task types this provider serves; empty means it accepts anything.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Pricing applied to this provider's reported usage.
    #[serde(default)]
    pub cost_model: CostModel,
}

fn default_enabled() -> bool {
    true
}

impl ProviderConfig {
    /// Creates an enabled, generic, zero-priority provider config.
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            priority: 0,
            capabilities: Vec::new(),
            cost_model: CostModel::default(),
        }
    }

    /// Sets the routing priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Declares the task types this provider serves.
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the pricing model.
    #[must_use]
    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Marks the provider disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this provider can serve the given task type.
    pub fn serves(&self, task_type: &str) -> bool {
        self.capabilities.is_empty() || self.capabilities.iter().any(|cap| cap == task_type)
    }
}
