//! Provider adapters for the switchboard orchestrator.
//!
//! Each adapter owns translating the normalized request into its backend's
//! wire format and back; the orchestrator core treats all adapters as
//! opaque [`switchboard_core::ProviderAdapter`] implementations.

/// Generic JSON-over-HTTP adapter.
pub mod http;
/// Scriptable mock adapter for tests.
pub mod mock;

pub use http::HttpProvider;
pub use mock::MockProvider;
