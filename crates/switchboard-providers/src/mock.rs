//! Mock provider for testing orchestrator behavior.
//!
//! Allows scripting successes, typed failures, and artificial latency,
//! enabling end-to-end testing of routing and failover without real
//! backends.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use switchboard_core::{
    AdapterResponse, Error, FailureKind, IgnoreLock as _, NormalizedRequest, ProviderAdapter,
    Result, Usage,
};
use tokio::time::sleep;

/// Mock provider with scriptable outcomes.
///
/// Fails the first `fail_first` calls with the configured failure kind,
/// then succeeds with the canned result. Every call sleeps for the
/// configured delay first, so timeout behavior is testable too.
#[derive(Clone)]
pub struct MockProvider {
    /// Name of this mock provider.
    name: String,
    /// Canned result returned on success.
    result: Arc<Mutex<JsonValue>>,
    /// Usage reported on success.
    usage: Usage,
    /// Number of leading calls that fail.
    fail_first: Arc<AtomicU64>,
    /// Failure kind for scripted failures.
    failure_kind: FailureKind,
    /// Artificial latency applied to every call.
    delay: Duration,
    /// Call history for verification.
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Creates a mock that always succeeds with a trivial result.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: Arc::new(Mutex::new(json!({"ok": true}))),
            usage: Usage::tokens(100, 50),
            fail_first: Arc::new(AtomicU64::new(0)),
            failure_kind: FailureKind::Provider,
            delay: Duration::ZERO,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the canned success result.
    #[must_use]
    pub fn with_result(self, result: JsonValue) -> Self {
        {
            let mut guard = self.result.lock_ignore_poison();
            *guard = result;
        }
        self
    }

    /// Sets the usage reported on success.
    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Fails the first `count` calls with [`FailureKind::Provider`].
    #[must_use]
    pub fn failing_first(self, count: u64) -> Self {
        self.fail_first.store(count, Ordering::SeqCst);
        self
    }

    /// Sets the failure kind used for scripted failures.
    #[must_use]
    pub fn with_failure_kind(mut self, kind: FailureKind) -> Self {
        self.failure_kind = kind;
        self
    }

    /// Applies an artificial delay to every call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }

    /// Task types of all calls made, in order.
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Builds the scripted failure for one call.
    fn scripted_failure(&self) -> Error {
        let message = format!("{} scripted failure", self.name);
        match self.failure_kind {
            FailureKind::Timeout => Error::Timeout(0),
            FailureKind::RateLimited => Error::RateLimited(message),
            FailureKind::Auth => Error::Auth(message),
            FailureKind::Provider => Error::Provider(message),
        }
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &NormalizedRequest) -> Result<AdapterResponse> {
        {
            let mut history = self.call_history.lock_ignore_poison();
            history.push(request.task_type.clone());
        }

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0
            && self
                .fail_first
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(self.scripted_failure());
        }

        let result = self.result.lock_ignore_poison().clone();
        Ok(AdapterResponse::new(result, self.usage))
    }
}
