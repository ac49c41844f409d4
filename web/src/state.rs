//! Application state for Axum handlers.

use crate::auth::ActorProvider;
use encore_core::QueueEngine;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Generic over the engine's store so tests run on the in-memory mock and
/// the binary runs on PostgreSQL.
pub struct AppState<S> {
    /// The queue engine.
    pub engine: Arc<QueueEngine<S>>,

    /// Identity collaborator for operator endpoints.
    pub actors: Arc<dyn ActorProvider>,
}

impl<S> AppState<S> {
    /// Create application state from an engine and an actor provider.
    #[must_use]
    pub fn new(engine: QueueEngine<S>, actors: Arc<dyn ActorProvider>) -> Self {
        Self {
            engine: Arc::new(engine),
            actors,
        }
    }
}

// Manual impl so `S: Clone` is not required (axum only clones the Arcs).
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            actors: Arc::clone(&self.actors),
        }
    }
}
