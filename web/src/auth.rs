//! Actor identity collaborator.
//!
//! The engine never decides *who* may call it; it receives an
//! already-authorized [`Actor`]. This module is the seam to whatever issues
//! those identities: production deployments hand out a shared operator
//! bearer token, tests use the in-memory mock.

use encore_core::{Actor, EngineError, Result};
#[cfg(feature = "test-utils")]
use std::collections::HashMap;

/// Resolves a bearer token into an authorized actor.
#[async_trait::async_trait]
pub trait ActorProvider: Send + Sync {
    /// Authenticate a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unauthorized`] for unknown tokens.
    async fn authenticate(&self, token: &str) -> Result<Actor>;
}

/// Single shared-token provider.
///
/// One configured token maps to one operator identity; everything else is
/// rejected. Enough for a single-operator venue setup.
#[derive(Debug, Clone)]
pub struct StaticTokenActorProvider {
    token: String,
    actor: Actor,
}

impl StaticTokenActorProvider {
    /// Create a provider accepting `token` as `actor`.
    #[must_use]
    pub const fn new(token: String, actor: Actor) -> Self {
        Self { token, actor }
    }
}

#[async_trait::async_trait]
impl ActorProvider for StaticTokenActorProvider {
    async fn authenticate(&self, token: &str) -> Result<Actor> {
        if token == self.token {
            Ok(self.actor)
        } else {
            Err(EngineError::Unauthorized)
        }
    }
}

/// Mock actor provider for testing.
///
/// Maps fixed tokens to fixed actors, so tests can exercise both unknown
/// tokens and known-but-underprivileged roles.
#[cfg(feature = "test-utils")]
#[derive(Debug, Clone, Default)]
pub struct MockActorProvider {
    actors: HashMap<String, Actor>,
}

#[cfg(feature = "test-utils")]
impl MockActorProvider {
    /// Create an empty mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an actor.
    #[must_use]
    pub fn with_actor(mut self, token: &str, actor: Actor) -> Self {
        self.actors.insert(token.to_string(), actor);
        self
    }
}

#[cfg(feature = "test-utils")]
#[async_trait::async_trait]
impl ActorProvider for MockActorProvider {
    async fn authenticate(&self, token: &str) -> Result<Actor> {
        self.actors
            .get(token)
            .copied()
            .ok_or(EngineError::Unauthorized)
    }
}
