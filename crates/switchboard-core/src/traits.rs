use async_trait::async_trait;

use crate::{AdapterResponse, NormalizedRequest, Result};

/// Trait implemented by every backend provider adapter.
///
/// Adapters own the translation between the normalized request and their
/// backend's wire format. Timeout enforcement and retry policy are the
/// executor's concern: `invoke` runs until the backend answers or fails,
/// and the caller bounds it by dropping the future.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Returns the unique identifier for this adapter.
    fn name(&self) -> &str;

    /// Executes the request against the backend.
    ///
    /// # Errors
    ///
    /// Returns a typed [`crate::Error`] if the backend is unreachable,
    /// rejects the call, or returns a response that cannot be normalized.
    async fn invoke(&self, request: &NormalizedRequest) -> Result<AdapterResponse>;
}
