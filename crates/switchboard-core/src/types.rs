use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Normalized request handed to a provider adapter.
///
/// The orchestrator core never sees a provider's wire format; adapters
/// translate this shape into whatever their backend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRequest {
    /// Task type the caller submitted (for example `chat` or `embeddings`).
    pub task_type: String,
    /// Opaque caller-supplied payload.
    pub payload: JsonValue,
}

impl NormalizedRequest {
    /// Creates a new normalized request.
    pub fn new<T: Into<String>>(task_type: T, payload: JsonValue) -> Self {
        Self {
            task_type: task_type.into(),
            payload,
        }
    }
}

/// Usage reported by an adapter for one completed call.
///
/// Cost models price whichever dimensions apply; unused dimensions stay 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens consumed, where the backend meters tokens.
    pub input_tokens: u64,
    /// Output tokens produced, where the backend meters tokens.
    pub output_tokens: u64,
    /// Bytes processed, where the backend meters payload size.
    pub bytes: u64,
}

impl Usage {
    /// Total tokens across input and output.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Token-metered usage.
    #[must_use]
    pub fn tokens(input: u64, output: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            bytes: 0,
        }
    }

    /// Byte-metered usage.
    #[must_use]
    pub fn bytes(bytes: u64) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            bytes,
        }
    }
}

/// Result returned by a provider adapter for one successful call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterResponse {
    /// Raw result the adapter normalized out of the backend response.
    pub raw: JsonValue,
    /// Usage the backend reported for the call.
    pub usage: Usage,
}

impl AdapterResponse {
    /// Creates a new adapter response.
    #[must_use]
    pub fn new(raw: JsonValue, usage: Usage) -> Self {
        Self { raw, usage }
    }
}

/// Latency preference for a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Latency {
    /// Tight per-attempt timeout; ties broken by observed latency.
    Low,
    /// Default timeout; ties broken by expected cost.
    #[default]
    Normal,
}

/// Optional per-job requirements supplied at submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    /// Latency preference.
    #[serde(default)]
    pub latency: Latency,
    /// Pin the job to exactly this provider; no substitution if ineligible.
    #[serde(default)]
    pub provider: Option<String>,
    /// Drop candidates whose estimated cost exceeds this ceiling (USD).
    #[serde(default)]
    pub max_cost: Option<f64>,
}

impl Requirements {
    /// Requirements with defaults (normal latency, no pin, no ceiling).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the latency preference.
    #[must_use]
    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Pins the job to a single provider.
    #[must_use]
    pub fn with_provider<T: Into<String>>(mut self, provider: T) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets a cost ceiling in USD.
    #[must_use]
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_totals() {
        let usage = Usage::tokens(120, 80);
        assert_eq!(usage.total_tokens(), 200);
        assert_eq!(usage.bytes, 0);

        let usage = Usage::bytes(4096);
        assert_eq!(usage.total_tokens(), 0);
        assert_eq!(usage.bytes, 4096);
    }

    #[test]
    fn test_requirements_builder() {
        let requirements = Requirements::new()
            .with_latency(Latency::Low)
            .with_provider("alpha")
            .with_max_cost(0.5);

        assert_eq!(requirements.latency, Latency::Low);
        assert_eq!(requirements.provider.as_deref(), Some("alpha"));
        assert_eq!(requirements.max_cost, Some(0.5));
    }

    #[test]
    fn test_requirements_deserialize_defaults() {
        let requirements: Requirements = match serde_json::from_str("{}") {
            Ok(requirements) => requirements,
            Err(error) => panic!("deserialize failed: {error}"),
        };
        assert_eq!(requirements.latency, Latency::Normal);
        assert!(requirements.provider.is_none());
        assert!(requirements.max_cost.is_none());
    }

    #[test]
    fn test_normalized_request_roundtrip() {
        let request = NormalizedRequest::new("chat", json!({"prompt": "hi"}));
        let serialized = match serde_json::to_string(&request) {
            Ok(serialized) => serialized,
            Err(error) => panic!("serialize failed: {error}"),
        };
        assert!(serialized.contains("\"chat\""));
    }
}
