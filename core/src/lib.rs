//! Request queue and status lifecycle engine.
//!
//! This crate is the core of Encore: it owns each song request's status,
//! enforces first-come-first-served ordering within status buckets, prevents
//! duplicate concurrent submissions, records who changed a status and when,
//! and computes the windowed aggregates the operator dashboard displays.
//!
//! # Architecture
//!
//! The engine holds no process-wide state. Every operation is a short
//! request/response against a durable store reached through the
//! [`RequestStore`] trait, so every projection is a fresh, consistent read:
//!
//! ```text
//! submit ──► store (PENDING) ──► transition ──► store (any status)
//!                 │                                  │
//!                 ▼                                  ▼
//!          queue / pending / history / discarded projections
//! ```
//!
//! Concrete stores live elsewhere: `encore-postgres` for production, the
//! in-memory [`mocks::MockRequestStore`] for tests.
//!
//! # Example
//!
//! ```no_run
//! use encore_core::{NewRequest, QueueEngine, mocks::MockRequestStore};
//!
//! # async fn example() -> encore_core::Result<()> {
//! let engine = QueueEngine::new(MockRequestStore::new());
//! let request = engine
//!     .submit(NewRequest {
//!         requester_name: "Alice".to_string(),
//!         song_title: "Imagine".to_string(),
//!         requester_email: None,
//!     })
//!     .await?;
//! let position = engine.position_of(request.id).await?;
//! assert_eq!(position, 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod request;
pub mod store;
pub mod window;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export key types for convenience
pub use engine::{BulkOutcome, DashboardStats, DeleteSelection, QueueEngine};
pub use error::{EngineError, Result};
pub use request::{
    Actor, ActorId, ActorRole, NewRequest, QueueEntry, RequestId, RequestStatus, SongRequest,
};
pub use store::{HistoryFilter, HistoryPage, RequestStore, DEFAULT_PAGE_SIZE};
