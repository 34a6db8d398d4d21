//! Core types and traits for the switchboard orchestrator.
//!
//! This crate provides the boundary types shared between the orchestrator
//! core and provider adapters: the normalized request/response shapes, the
//! adapter trait, usage-based cost models, and the error taxonomy.

/// Provider configuration and cost models.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Synchronization utilities.
pub mod sync;
/// Trait definitions for provider adapters.
pub mod traits;
/// Boundary data types for requests, responses, and requirements.
pub mod types;

pub use config::{CostModel, ProviderConfig};
pub use error::{Error, FailureKind, Result};
pub use sync::IgnoreLock;
pub use traits::ProviderAdapter;
pub use types::{AdapterResponse, Latency, NormalizedRequest, Requirements, Usage};
