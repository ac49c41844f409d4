//! Axum HTTP binding for the Encore request queue.
//!
//! This crate is the imperative shell around [`encore_core::QueueEngine`]:
//! it parses requests, resolves the acting identity, dispatches one engine
//! operation per endpoint, and maps engine errors onto HTTP responses. All
//! queue semantics live in the engine; nothing here caches or reorders.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract data** (JSON, query, path, bearer token)
//! 3. **Resolve the actor** for operator endpoints via [`ActorProvider`]
//! 4. **Call the engine** operation
//! 5. **Map the result** to JSON + status code
//!
//! # Surface
//!
//! Public: submit, queue (reduced APPROVED projection), position, health.
//! Operator: list by status, discarded, history, transition, bulk
//! transition, delete (ids or ALL), dashboard stats.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use auth::{ActorProvider, StaticTokenActorProvider};
pub use config::AppConfig;
pub use error::AppError;
pub use extractors::{CorrelationId, OperatorActor};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::app_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
